//! Users command - account administration from the shell.
//!
//! `users set-role` is how the first admin gets created.

use std::sync::Arc;

use crate::cli::args::{UsersAction, UsersArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Database, Persistence};
use crate::services::{UserManager, UserService};

/// Execute the users command
pub async fn execute(args: UsersArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config).await?;
    let users = UserManager::new(Arc::new(Persistence::new(db.get_connection())));

    match args.action {
        UsersAction::SetRole { email, role } => {
            let user = users.set_role_by_email(&email, &role).await?;
            tracing::info!(user_id = %user.id, role = %user.role, "Role updated");
            println!("{} is now {}", user.email, user.role);
        }
    }

    db.close().await?;
    Ok(())
}
