use neurocell::CellTemplate;

pub fn run(template: &CellTemplate) -> anyhow::Result<()> {
    println!("{}", template.to_json()?);
    Ok(())
}
