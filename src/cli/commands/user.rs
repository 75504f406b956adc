//! User management command handlers

use anyhow::Context;
use std::io::{BufRead, Write};

use crate::config::Config;
use crate::constants::limits::MAX_PAGE_SIZE;
use crate::db::Store;
use crate::models::user::{NewUser, User, UserQuery};
use crate::services::{PasswordManager, SeaOrmUserService, UserError, UserService};

async fn user_service(config: &Config) -> anyhow::Result<SeaOrmUserService> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;
    let passwords = PasswordManager::from_config(&config.security)?;
    Ok(SeaOrmUserService::new(store, passwords))
}

fn read_password() -> anyhow::Result<String> {
    if let Ok(password) = std::env::var("USERDESK_PASSWORD") {
        return Ok(password);
    }

    print!("Password: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read password from stdin")?;

    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn cmd_user_add(
    config: &Config,
    username: &str,
    email: &str,
    full_name: Option<&str>,
) -> anyhow::Result<()> {
    let service = user_service(config).await?;
    let password = read_password()?;

    let new_user = NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password,
        full_name: full_name.map(str::to_string),
        is_active: true,
    };

    let user = add_user(&service, new_user).await?;
    println!("✓ Created user '{}' (ID: {})", user.username, user.id);
    Ok(())
}

/// Invalid input and taken names fail the command.
async fn add_user(service: &SeaOrmUserService, new_user: NewUser) -> anyhow::Result<User> {
    let username = new_user.username.clone();
    service
        .create_user(new_user)
        .await
        .with_context(|| format!("Failed to create user '{username}'"))
}

pub async fn cmd_user_list(config: &Config, search: Option<&str>) -> anyhow::Result<()> {
    let service = user_service(config).await?;
    let query = UserQuery {
        skip: 0,
        limit: MAX_PAGE_SIZE,
        search: search.map(str::to_string),
    };
    let page = service.list_users(&query).await?;

    if page.users.is_empty() {
        println!("No users found.");
        println!();
        println!("Add one with: userdesk user add <username> <email>");
        return Ok(());
    }

    println!("Users ({} total)", page.total);
    println!("{:-<70}", "");

    for user in &page.users {
        let status = if user.is_active { "active" } else { "inactive" };
        println!("{:>5}  {:<20} {:<30} {}", user.id, user.username, user.email, status);
        if let Some(name) = &user.full_name {
            println!("       {name}");
        }
    }

    if page.total > page.users.len() as u64 {
        println!();
        println!("Showing the first {} matches.", page.users.len());
    }

    Ok(())
}

pub async fn cmd_user_remove(config: &Config, id: i32, yes: bool) -> anyhow::Result<()> {
    let service = user_service(config).await?;

    let user = match service.get_user(id).await {
        Ok(user) => user,
        Err(UserError::NotFound(_)) => {
            println!("User with ID {id} not found.");
            println!("Use 'userdesk user list' to see user IDs.");
            return Ok(());
        }
        Err(e) => return Err(anyhow::anyhow!(e)),
    };

    if !yes {
        println!("Delete user '{}' (ID: {})?", user.username, user.id);
        println!("Enter 'y' to confirm, anything else to cancel:");

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    service.delete_user(id).await?;
    println!("✓ Deleted: {}", user.username);
    Ok(())
}
