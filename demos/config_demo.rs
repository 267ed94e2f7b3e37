use hash_token::{ConfigPreset, TokenConfig, create_factory};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Configuration Presets ===\n");
    for preset in [
        ConfigPreset::Production,
        ConfigPreset::Development,
        ConfigPreset::HighSecurity,
        ConfigPreset::FromEnv,
    ] {
        let config = TokenConfig::from(preset);
        println!("{preset:?}: {}", config.summary());
        for warning in config.validate() {
            println!("  ⚠️  {warning}");
        }
    }

    // Set HASH_TOKEN_SCHEME / HASH_TOKEN_ALGORITHM / ... to change this factory
    let config = TokenConfig::from(ConfigPreset::FromEnv);
    println!("\nJSON: {}", config.to_json()?);

    let secret = hash_token::token::secret::generate_secret_hex(32);
    let factory = create_factory(&config, secret.as_str())?;
    let token = factory.generate("demo-payload")?;
    println!(
        "\n{} factory ({}) issued {token}, verified: {}",
        factory.name(),
        factory.algorithm(),
        factory.verify("demo-payload", &token)?
    );

    Ok(())
}
