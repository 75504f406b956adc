use crate::config::Config;

pub fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("✓ Created config.toml with default settings");
        println!();
        println!("Set security.jwt.secret (or USERDESK_JWT_SECRET) before going to production.");
    } else {
        println!("config.toml already exists, leaving it untouched.");
    }
    Ok(())
}
