use system2mqtt::agent::MonitorOptions;
use system2mqtt::connector::ConnectorOptions;

#[derive(schemars::JsonSchema)]
#[allow(dead_code)]
struct Configuration {
    connector: ConnectorOptions,
    monitor: MonitorOptions,
}

fn main() -> anyhow::Result<()> {
    let schema = schemars::schema_for!(Configuration);
    let path = "schema/configuration.json";

    std::fs::create_dir_all("schema")?;
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &schema)?;

    println!("Wrote schema to: {path}");

    Ok(())
}
