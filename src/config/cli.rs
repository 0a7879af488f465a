use crate::config::ClientConfig;
use crate::domain::model::RoutePoint;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_TOKEN_FILE: &str = "walkroute-tokens.json";

#[derive(Debug, Clone, Parser)]
#[command(name = "walkroute")]
#[command(about = "Client for the walking-route backend")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Override backend.base_url")]
    pub base_url: Option<String>,

    #[arg(long, help = "Where the token pair is persisted")]
    pub token_file: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Exchange an identity-provider token for a backend session
    Login {
        #[arg(long)]
        identity_token: String,
    },
    /// Force a token refresh
    Refresh,
    /// End the session (always succeeds locally)
    Logout,
    /// Show the local session state
    Status,
    /// Print the signed-in user's profile
    Profile,
    /// Update profile fields
    UpdateProfile {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long, help = "Avatar URL; pass an empty string to clear it")]
        picture: Option<String>,
    },
    /// Search points of interest around a location
    Places {
        #[arg(long, value_parser = parse_point, help = "Center as lat,lon")]
        center: RoutePoint,
        #[arg(long, default_value = "1000")]
        radius: u32,
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Build a walking route from a start point through selected points
    Route {
        #[arg(long, value_parser = parse_point, help = "Start as lat,lon")]
        start: RoutePoint,
        #[arg(long = "point", value_parser = parse_point, help = "Selected point as lat,lon (repeatable)")]
        points: Vec<RoutePoint>,
        #[arg(long, help = "Filter radius in meters (defaults to route.radius_meters)")]
        radius: Option<f64>,
    },
}

pub fn parse_point(value: &str) -> std::result::Result<RoutePoint, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected lat,lon but got '{}'", value))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {}", e))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("bad longitude: {}", e))?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("coordinates out of range: {}", value));
    }
    Ok(RoutePoint::new(lat, lon))
}

impl CliConfig {
    /// File config (or defaults) with command-line overrides applied.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };
        if let Some(base_url) = &self.base_url {
            config.backend.base_url = base_url.clone();
        }
        Ok(config)
    }

    pub fn token_path(&self, config: &ClientConfig) -> PathBuf {
        self.token_file
            .clone()
            .or_else(|| config.session.token_file.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("55.0,37.5"), Ok(RoutePoint::new(55.0, 37.5)));
        assert_eq!(parse_point(" 55.0 , 37.5 "), Ok(RoutePoint::new(55.0, 37.5)));
        assert!(parse_point("55.0").is_err());
        assert!(parse_point("abc,1").is_err());
        assert!(parse_point("95.0,37.5").is_err());
    }

    #[test]
    fn test_route_command_parses_repeated_points() {
        let cli = CliConfig::try_parse_from([
            "walkroute",
            "route",
            "--start",
            "55.0,37.0",
            "--point",
            "55.01,37.0",
            "--point",
            "55.02,37.0",
        ])
        .unwrap();

        match cli.command {
            Command::Route { start, points, radius } => {
                assert_eq!(start, RoutePoint::new(55.0, 37.0));
                assert_eq!(points.len(), 2);
                assert_eq!(radius, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_overrides_apply_over_defaults() {
        let cli = CliConfig::try_parse_from([
            "walkroute",
            "--base-url",
            "http://localhost:8080",
            "--token-file",
            "/tmp/t.json",
            "status",
        ])
        .unwrap();

        let config = cli.client_config().unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:8080");
        assert_eq!(cli.token_path(&config), PathBuf::from("/tmp/t.json"));
    }

    #[test]
    fn test_token_path_falls_back_to_config_then_default() {
        let cli = CliConfig::try_parse_from(["walkroute", "status"]).unwrap();
        let mut config = ClientConfig::default();
        assert_eq!(cli.token_path(&config), PathBuf::from(DEFAULT_TOKEN_FILE));

        config.session.token_file = Some("/var/lib/walkroute/tokens.json".to_string());
        assert_eq!(
            cli.token_path(&config),
            PathBuf::from("/var/lib/walkroute/tokens.json")
        );
    }

    #[test]
    fn test_places_categories_are_comma_separated() {
        let cli = CliConfig::try_parse_from([
            "walkroute",
            "places",
            "--center",
            "55.0,37.0",
            "--categories",
            "tourism,catering",
        ])
        .unwrap();

        match cli.command {
            Command::Places { categories, radius, .. } => {
                assert_eq!(categories, vec!["tourism", "catering"]);
                assert_eq!(radius, 1000);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
