use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ORG_ID: &str = "006de98a-131c-4847-92a9-3150033d6a35";

#[derive(Parser, Debug, Default)]
#[command(name = "skills-report", about = "Monthly skills-created report for one organization")]
pub struct Cli {
    /// Organization to report on.
    #[arg(long, env = "SKILLS_REPORT_ORG_ID")]
    pub org_id: Option<String>,

    /// Extra TOML config file, merged over the standard locations.
    #[arg(long, env = "SKILLS_REPORT_CONFIG_PATH")]
    pub config: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub mongodb: MongoSettings,
    pub source: SourceSettings,
    pub report: ReportSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MongoSettings {
    pub uri: String,
    pub source_database: String,
    pub report_database: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourceSettings {
    pub skills_collection: String,
    pub organizations_collection: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReportSettings {
    pub collection: String,
    pub org_id: String,
    #[serde(default)]
    pub write_mode: WriteMode,
}

/// How the report collection is brought up to date.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Empty the whole collection, then insert. Other organizations' rows are lost.
    #[default]
    ReplaceAll,
    /// Delete only the processed organization's rows, then insert.
    ReplaceOrg,
    /// Upsert each row keyed by (`org_id`, `year_month`).
    Upsert,
}

impl Settings {
    #[allow(clippy::result_large_err)]
    pub fn new() -> Result<Self, figment::Error> {
        Self::from_cli(Cli::parse())
    }

    #[allow(clippy::result_large_err)]
    pub fn from_cli(cli: Cli) -> Result<Self, figment::Error> {
        Self::figment(cli).extract()
    }

    fn figment(cli: Cli) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        figment = figment.merge(Toml::file("/etc/skillsreport/config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            figment = figment.merge(Toml::file(config_dir.join("skillsreport/config.toml")));
        }

        figment = figment.merge(Toml::file("skillsreport.toml"));

        if let Some(config_path) = &cli.config {
            figment = figment.merge(Toml::file(config_path));
        }

        // SKILLS_REPORT_MONGODB__URI, SKILLS_REPORT_REPORT__WRITE_MODE, ...
        figment = figment.merge(Env::prefixed("SKILLS_REPORT_").split("__"));

        figment = figment.merge(
            Env::raw()
                .only(&["MONGODB_URI"])
                .map(|_| "mongodb.uri".into()),
        );

        if let Some(org_id) = cli.org_id {
            figment = figment.merge(Serialized::default("report.org_id", org_id));
        }

        figment
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            mongodb: MongoSettings {
                uri: "mongodb://localhost:27017".to_string(),
                source_database: "htd-core-ms".to_string(),
                report_database: "by-reporting".to_string(),
            },
            source: SourceSettings {
                skills_collection: "skills".to_string(),
                organizations_collection: "organizations".to_string(),
            },
            report: ReportSettings {
                collection: "rep_skills_created".to_string(),
                org_id: DEFAULT_ORG_ID.to_string(),
                write_mode: WriteMode::ReplaceAll,
            },
        }
    }
}
