use serde_json::json;

use crate::api::validation::{is_valid_email, normalize_email};
use crate::auth::password::hash_password;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::{open_store, NewProfile};

pub async fn create(
    email: String,
    name: String,
    password: String,
    staff: bool,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let email = email.trim();
    if !is_valid_email(email) {
        anyhow::bail!("invalid email address: {}", email);
    }
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("name may not be blank");
    }
    if password.is_empty() {
        anyhow::bail!("password may not be blank");
    }

    let store = open_store(&config().database).await?;
    let profile = store
        .create_profile(NewProfile {
            email: normalize_email(email),
            name: name.to_string(),
            bio: String::new(),
            password_hash: hash_password(&password).await?,
            is_staff: staff,
        })
        .await?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "user_id": profile.user_id, "profile": profile, "is_staff": staff })
        ),
        OutputFormat::Text => println!(
            "Created user {} ({}) with profile {}{}",
            profile.user_id,
            profile.email,
            profile.id,
            if staff { " [staff]" } else { "" }
        ),
    }
    Ok(())
}
