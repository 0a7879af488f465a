use anyhow::Context;
use clap::Parser;
use std::collections::BTreeSet;
use std::sync::Arc;
use walkroute::config::Command;
use walkroute::utils::error::ErrorSeverity;
use walkroute::utils::{logger, validation::Validate};
use walkroute::{
    ApiClient, CliConfig, ClientConfig, ClientError, FileTokenStore, PlaceQuery, UserUpdate,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("Running {}", command_name(&cli.command));

    let config = load_config(&cli).context("Cannot load walkroute configuration")?;

    if let Err(e) = run(&cli, config).await {
        tracing::error!(
            "❌ {} failed: {} (Severity: {:?})",
            command_name(&cli.command),
            e,
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        if e.requires_login() {
            eprintln!("🔑 Sign in again with `walkroute login --identity-token <TOKEN>`");
        }

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

fn load_config(cli: &CliConfig) -> Result<ClientConfig, ClientError> {
    let config = cli.client_config()?;
    config.validate()?;
    Ok(config)
}

async fn run(cli: &CliConfig, config: ClientConfig) -> Result<(), ClientError> {
    let token_path = cli.token_path(&config);
    tracing::debug!("Token file: {}", token_path.display());
    let client = ApiClient::new(config, Arc::new(FileTokenStore::new(token_path)))?;

    match &cli.command {
        Command::Login { identity_token } => {
            client.session().login(identity_token).await?;
            println!("✅ Logged in");
        }
        Command::Refresh => {
            let tokens = client.session().refresh().await?;
            match tokens.expires_at {
                Some(expires_at) => println!("✅ Token refreshed, valid until {}", expires_at),
                None => println!("✅ Token refreshed"),
            }
        }
        Command::Logout => {
            client.session().logout().await;
            println!("✅ Logged out");
        }
        Command::Status => {
            let tokens = client.session().tokens()?;
            println!("State: {:?}", client.session().state());
            if let Some(tokens) = tokens {
                println!("Refresh token stored: {}", tokens.refresh_token().is_some());
                if let Some(expires_at) = tokens.expires_at {
                    println!("Access token expires: {}", expires_at);
                }
            }
        }
        Command::Profile => {
            let user = client.profile().fetch_me().await?;
            println!("{} <{}>", user.display_name(), user.email);
        }
        Command::UpdateProfile {
            email,
            full_name,
            first_name,
            last_name,
            picture,
        } => {
            let update = UserUpdate {
                email: email.clone(),
                full_name: full_name.clone(),
                first_name: first_name.clone(),
                last_name: last_name.clone(),
            };
            let mut user = None;
            if !update.is_empty() {
                user = Some(client.profile().update_me(&update).await?);
            }
            if let Some(picture) = picture {
                let url = Some(picture.as_str()).filter(|p| !p.is_empty());
                user = Some(client.profile().update_picture(url).await?);
            }
            match user {
                Some(user) => println!("✅ Updated {} <{}>", user.display_name(), user.email),
                None => println!("Nothing to update"),
            }
        }
        Command::Places {
            center,
            radius,
            categories,
            limit,
        } => {
            let query = PlaceQuery {
                center: *center,
                radius_meters: *radius,
                categories: categories.iter().cloned().collect::<BTreeSet<_>>(),
                limit: *limit,
            };
            let places = client.places().search(&query).await?;
            println!("📍 {} places", places.len());
            for place in places {
                println!(
                    "  {} ({:.5}, {:.5}) {}",
                    place.name, place.coordinates.lat, place.coordinates.lon, place.address
                );
            }
        }
        Command::Route {
            start,
            points,
            radius,
        } => {
            let planner = client.route_planner();
            let radius = radius.unwrap_or(planner.settings().radius_meters);
            let route = planner.build_route(Some(*start), points, radius).await?;
            println!(
                "🚶 {:.0} m, {:.0} min, {} points",
                route.distance_meters,
                route.duration_seconds / 60.0,
                route.points.len()
            );
        }
    }

    Ok(())
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Login { .. } => "login",
        Command::Refresh => "refresh",
        Command::Logout => "logout",
        Command::Status => "status",
        Command::Profile => "profile",
        Command::UpdateProfile { .. } => "update-profile",
        Command::Places { .. } => "places",
        Command::Route { .. } => "route",
    }
}
