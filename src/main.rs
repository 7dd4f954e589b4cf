use fluid_cursor::FluidConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::var("FLUID_CURSOR_SEED") {
        Ok(seed) => FluidConfig::new().with_seed(seed.parse()?),
        Err(_) => FluidConfig::new(),
    };

    fluid_cursor::window::run(config)?;
    Ok(())
}
