use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::db::Database;
use crate::models::CreateUser;

/// Ensure the configured admin account exists so a fresh database is usable
/// by WebDAV clients immediately.
pub async fn seed_admin_user(db: &Database, config: &Config) -> Result<()> {
    if db
        .get_user_by_username(&config.admin_username)
        .await?
        .is_some()
    {
        info!("admin user '{}' already exists", config.admin_username);
        return Ok(());
    }

    let user = db
        .create_user(CreateUser {
            username: config.admin_username.clone(),
            password: config.admin_password.clone(),
        })
        .await?;

    info!(
        "created admin user '{}' (id: {})",
        user.username, user.id
    );
    Ok(())
}
