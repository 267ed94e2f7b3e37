use hash_token::{Secret, StepTokenFactory, TokenFactory, WindowTokenFactory};
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    // Secret shared by every instance that issues or verifies tokens
    let secret = Secret::generate(hash_token::token::secret::DEFAULT_SECRET_LENGTH);

    // Password-reset style token, valid for three days
    let window = WindowTokenFactory::builder("sha256", secret.clone())
        .with_validity(3)
        .build()?;
    let token = window.generate("reset:alice@example.org")?;
    println!("Window token: {token}");

    match window.check("reset:alice@example.org", &token) {
        Ok(()) => println!("✅ Window token accepted"),
        Err(e) => println!("❌ Window token rejected: {e}"),
    }
    match window.check("reset:mallory@example.org", &token) {
        Ok(()) => println!("❌ This should not happen - payload mismatch accepted"),
        Err(e) => println!("✅ Correctly rejected token for another payload: {e}"),
    }

    // Short login code, valid for the current three-minute step
    let step = StepTokenFactory::builder("sha256", secret)
        .with_validity(Duration::from_secs(180))
        .with_length(6)
        .build()?;
    let code = step.generate_token(Some("login:alice"))?;
    println!("Step code: {code}");

    if step.challenge(&code, Some("login:alice"))? {
        println!("✅ Step code accepted");
    } else {
        println!("❌ Step code rejected (the step ended between issue and check)");
    }

    Ok(())
}
