use std::time::Duration;

use deepl_client::{Client, Context};

fn main() -> Result<(), deepl_client::Error> {
    env_logger::init();

    // DEEPL_API_KEY and optionally DEEPL_BASE_URL, from the environment or a .env file
    let client = Client::from_env()?;
    let ctx = Context::with_timeout(Duration::from_secs(10));

    let result = client.translate(&ctx, "Hello", "EN", "JA")?;
    for translation in &result.translations {
        println!(
            "[{}] {}",
            translation.detected_source_language, translation.text
        );
    }

    let usage = client.account_status(&ctx)?;
    println!(
        "{} of {} characters used, {} left",
        usage.character_count,
        usage.character_limit,
        usage.remaining()
    );

    Ok(())
}
