/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Static configuration: selectors, timings and the command table.
//!
//! [`PawsConfig::default`] is the complete built-in setup. User TOML only
//! needs the fields it changes:
//!
//! ```toml
//! sequence_timeout_ms = 1500
//!
//! [[commands]]
//! keys = "s3"
//! href = "/s3/buckets"
//!
//! [[commands]]
//! keys = "b"
//! invoke = "region_dropdown"
//! ```
//!
//! A command whose `keys` names an already bound sequence replaces that
//! binding.

use serde::Deserialize;

use crate::input::{DEFAULT_SEQUENCE_TIMEOUT_MS, KeySequence, KeySequenceError};
use crate::registries::atomic::catalog::{CatalogItem, RegionCatalog};

/// Local storage key the browser build reads user TOML from.
pub const CONFIG_STORAGE_KEY: &str = "paws.config";
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug)]
pub enum ConfigError {
    Parse(toml::de::Error),
    InvalidKeySequence {
        keys: String,
        source: KeySequenceError,
    },
    InvalidCommand {
        keys: String,
        reason: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid configuration: {err}"),
            Self::InvalidKeySequence { keys, source } => {
                write!(f, "invalid key sequence `{keys}`: {source}")
            }
            Self::InvalidCommand { keys, reason } => write!(f, "command `{keys}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::InvalidKeySequence { source, .. } => Some(source),
            Self::InvalidCommand { .. } => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err)
    }
}

/// Behavior owned by the crate that a command can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinCommand {
    AnchorsNext,
    AnchorsPrevious,
    AnchorsSelect,
    AnchorsClear,
    RegionPicker,
    RegionDropdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandTarget {
    Href(String),
    /// Path appended to the current page's origin at dispatch time.
    OriginHref(String),
    /// URL template; `{region}` becomes the signed-in session's region.
    SessionRegionHref(String),
    Open(String),
    Focus(String),
    Invoke(BuiltinCommand),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawCommandSpec")]
pub struct CommandSpec {
    pub keys: String,
    pub sequence: KeySequence,
    pub target: CommandTarget,
}

impl CommandSpec {
    pub fn new(keys: &str, target: CommandTarget) -> Result<Self, ConfigError> {
        let sequence = KeySequence::parse(keys).map_err(|source| ConfigError::InvalidKeySequence {
            keys: keys.to_string(),
            source,
        })?;
        Ok(Self {
            keys: keys.to_string(),
            sequence,
            target,
        })
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCommandSpec {
    keys: String,
    href: Option<String>,
    origin_href: Option<String>,
    session_region_href: Option<String>,
    open: Option<String>,
    focus: Option<String>,
    invoke: Option<BuiltinCommand>,
}

impl TryFrom<RawCommandSpec> for CommandSpec {
    type Error = ConfigError;

    fn try_from(raw: RawCommandSpec) -> Result<Self, Self::Error> {
        let mut targets = [
            raw.href.map(CommandTarget::Href),
            raw.origin_href.map(CommandTarget::OriginHref),
            raw.session_region_href.map(CommandTarget::SessionRegionHref),
            raw.open.map(CommandTarget::Open),
            raw.focus.map(CommandTarget::Focus),
            raw.invoke.map(CommandTarget::Invoke),
        ]
        .into_iter()
        .flatten();

        let (Some(target), None) = (targets.next(), targets.next()) else {
            return Err(ConfigError::InvalidCommand {
                keys: raw.keys,
                reason: "expected exactly one of href, origin_href, session_region_href, open, \
                         focus or invoke"
                    .to_string(),
            });
        };
        Self::new(&raw.keys, target)
    }
}

/// A built-in binding left out of the table because it did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedCommand {
    pub keys: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PawsConfig {
    pub anchor_selector: String,
    /// Class marking the selected anchor; the selection is derived from it.
    pub anchor_marker_class: String,
    pub sequence_timeout_ms: u64,
    /// Region assumed when the current URL names none.
    pub default_region: String,
    pub theme_storage_key: String,
    pub dark_mode_classes: Vec<String>,
    pub region_dropdown_button: String,
    pub region_dropdown_list: String,
    pub commands: Vec<CommandSpec>,
    /// Reported through diagnostics when the app starts.
    pub rejected_commands: Vec<RejectedCommand>,
    /// Entries added to, or replacing entries of, the built-in region catalog.
    pub regions: Vec<CatalogItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PawsConfigOverrides {
    anchor_selector: Option<String>,
    anchor_marker_class: Option<String>,
    sequence_timeout_ms: Option<u64>,
    default_region: Option<String>,
    theme_storage_key: Option<String>,
    dark_mode_classes: Option<Vec<String>>,
    region_dropdown_button: Option<String>,
    region_dropdown_list: Option<String>,
    #[serde(default)]
    commands: Vec<CommandSpec>,
    #[serde(default)]
    regions: Vec<CatalogItem>,
}

impl PawsConfig {
    /// Built-in defaults with `source` layered on top.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let overrides: PawsConfigOverrides = toml::from_str(source)?;
        let mut config = Self::default();
        config.apply(overrides);
        Ok(config)
    }

    fn apply(&mut self, overrides: PawsConfigOverrides) {
        let PawsConfigOverrides {
            anchor_selector,
            anchor_marker_class,
            sequence_timeout_ms,
            default_region,
            theme_storage_key,
            dark_mode_classes,
            region_dropdown_button,
            region_dropdown_list,
            commands,
            regions,
        } = overrides;

        if let Some(value) = anchor_selector {
            self.anchor_selector = value;
        }
        if let Some(value) = anchor_marker_class {
            self.anchor_marker_class = value;
        }
        if let Some(value) = sequence_timeout_ms {
            self.sequence_timeout_ms = value;
        }
        if let Some(value) = default_region {
            self.default_region = value;
        }
        if let Some(value) = theme_storage_key {
            self.theme_storage_key = value;
        }
        if let Some(value) = dark_mode_classes {
            self.dark_mode_classes = value;
        }
        if let Some(value) = region_dropdown_button {
            self.region_dropdown_button = value;
        }
        if let Some(value) = region_dropdown_list {
            self.region_dropdown_list = value;
        }
        for command in commands {
            self.upsert_command(command);
        }
        self.regions.extend(regions);
    }

    /// Add `command`, dropping any earlier command bound to the same sequence.
    pub fn upsert_command(&mut self, command: CommandSpec) {
        self.commands.retain(|existing| existing.sequence != command.sequence);
        self.commands.push(command);
    }

    pub fn catalog(&self) -> RegionCatalog {
        let mut catalog = RegionCatalog::default();
        for item in &self.regions {
            catalog.upsert(item.clone());
        }
        catalog
    }
}

fn parse_command_table<'a>(
    table: impl IntoIterator<Item = (&'a str, CommandTarget)>,
) -> (Vec<CommandSpec>, Vec<RejectedCommand>) {
    let mut commands = Vec::new();
    let mut rejected = Vec::new();
    for (keys, target) in table {
        match CommandSpec::new(keys, target) {
            Ok(command) => commands.push(command),
            Err(err) => rejected.push(RejectedCommand {
                keys: keys.to_string(),
                reason: err.to_string(),
            }),
        }
    }
    (commands, rejected)
}

fn default_commands() -> (Vec<CommandSpec>, Vec<RejectedCommand>) {
    use BuiltinCommand::*;
    use CommandTarget::*;

    let table = [
        ("home", Href("/console".into())),
        ("cct", Href("/cloudtrail/home#/events".into())),
        (
            "ec2",
            OriginHref("/ec2/v2/home#Instances:sort=desc:launchTime".into()),
        ),
        ("iam", Href("/iam/home#home".into())),
        ("rds", Href("/rds/home#dbinstances:".into())),
        ("s3", Href("/s3/home".into())),
        ("vpc", Href("/vpc/home".into())),
        ("cfn", Href("/cloudformation/home".into())),
        ("clf", Href("/cloudfront/v3/home".into())),
        ("cd", Href("/codesuite/codedeploy".into())),
        ("cp", Href("/codesuite/codepipeline".into())),
        ("ssm", Href("/systems-manager/home".into())),
        ("da", Href("/lambda/home".into())),
        ("org", Href("/organizations".into())),
        ("cw", Href("/cloudwatch".into())),
        ("elb", Href("/ec2/v2/home#LoadBalancers:".into())),
        ("sg", Href("/ec2/v2/home#SecurityGroups:sort=groupId".into())),
        (
            "alb",
            SessionRegionHref(
                "https://{region}.console.aws.amazon.com/ec2/home?region={region}#LoadBalancers:v=3"
                    .into(),
            ),
        ),
        ("j", Invoke(AnchorsNext)),
        ("k", Invoke(AnchorsPrevious)),
        ("l", Invoke(AnchorsSelect)),
        ("enter", Invoke(AnchorsSelect)),
        ("escape", Invoke(AnchorsClear)),
        ("r", Invoke(RegionPicker)),
        ("R", Invoke(RegionDropdown)),
        ("/", Focus(".gwt-TextBox".into())),
        ("lam", Focus(".inputAndSuggestions.input".into())),
        ("?", Open("https://github.com/xargsuk/paws#shortcuts".into())),
    ];

    parse_command_table(table)
}

impl Default for PawsConfig {
    fn default() -> Self {
        let (commands, rejected_commands) = default_commands();
        Self {
            anchor_selector: ".gwt-Anchor".to_string(),
            anchor_marker_class: "paws-anchor-selected".to_string(),
            sequence_timeout_ms: DEFAULT_SEQUENCE_TIMEOUT_MS,
            default_region: DEFAULT_REGION.to_string(),
            theme_storage_key: "paws.theme".to_string(),
            dark_mode_classes: vec![
                "awsui-dark-mode".to_string(),
                "awsui-polaris-dark-mode".to_string(),
            ],
            region_dropdown_button: "button[data-testid='more-menu__awsc-nav-regions-menu-button']"
                .to_string(),
            region_dropdown_list: ".nav-menu__regions__list".to_string(),
            commands,
            rejected_commands,
            regions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_for<'a>(config: &'a PawsConfig, keys: &str) -> Option<&'a CommandTarget> {
        config
            .commands
            .iter()
            .find(|command| command.keys == keys)
            .map(|command| &command.target)
    }

    #[test]
    fn default_table_parses_every_binding() {
        let config = PawsConfig::default();
        assert_eq!(config.commands.len(), 28);
        assert_eq!(config.rejected_commands, Vec::new());
        assert_eq!(
            target_for(&config, "r"),
            Some(&CommandTarget::Invoke(BuiltinCommand::RegionPicker))
        );
        assert_eq!(
            target_for(&config, "s3"),
            Some(&CommandTarget::Href("/s3/home".into()))
        );
    }

    #[test]
    fn empty_toml_yields_defaults() {
        assert_eq!(PawsConfig::from_toml_str("").unwrap(), PawsConfig::default());
    }

    #[test]
    fn toml_overrides_scalars_and_replaces_bindings() {
        let config = PawsConfig::from_toml_str(
            r#"
            sequence_timeout_ms = 1500
            anchor_selector = "a.nav"

            [[commands]]
            keys = "s 3"
            href = "/s3/buckets"

            [[commands]]
            keys = "b"
            invoke = "region_dropdown"

            [[regions]]
            code = "us-gov-west-1"
            display_name = "AWS GovCloud (US-West)"
            "#,
        )
        .unwrap();

        assert_eq!(config.sequence_timeout_ms, 1500);
        assert_eq!(config.anchor_selector, "a.nav");
        assert_eq!(config.default_region, DEFAULT_REGION);

        let s3: Vec<_> = config
            .commands
            .iter()
            .filter(|command| command.sequence.symbols() == ["s", "3"])
            .collect();
        assert_eq!(s3.len(), 1);
        assert_eq!(s3[0].target, CommandTarget::Href("/s3/buckets".into()));
        assert_eq!(
            target_for(&config, "b"),
            Some(&CommandTarget::Invoke(BuiltinCommand::RegionDropdown))
        );
        assert!(config.catalog().get("us-gov-west-1").is_some());
    }

    #[test]
    fn command_needs_exactly_one_target() {
        let both = PawsConfig::from_toml_str(
            r#"
            [[commands]]
            keys = "x"
            href = "/a"
            open = "https://example.com"
            "#,
        );
        assert!(matches!(both, Err(ConfigError::Parse(_))));

        let neither = PawsConfig::from_toml_str("[[commands]]\nkeys = \"x\"\n");
        assert!(neither.is_err());
    }

    #[test]
    fn invalid_key_sequence_is_rejected() {
        let result =
            PawsConfig::from_toml_str("[[commands]]\nkeys = \"g return\"\nhref = \"/\"\n");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("return"), "{err}");

        assert!(matches!(
            CommandSpec::new("", CommandTarget::Href("/".into())),
            Err(ConfigError::InvalidKeySequence { .. })
        ));
    }

    #[test]
    fn unknown_fields_and_builtins_are_rejected() {
        assert!(PawsConfig::from_toml_str("colour = \"red\"").is_err());
        assert!(
            PawsConfig::from_toml_str("[[commands]]\nkeys = \"x\"\ninvoke = \"explode\"\n")
                .is_err()
        );
    }

    #[test]
    fn unparsable_table_entries_are_kept_aside() {
        let (commands, rejected) = parse_command_table([
            ("s3", CommandTarget::Href("/s3/home".into())),
            ("", CommandTarget::Href("/".into())),
            ("g bogus", CommandTarget::Href("/".into())),
        ]);

        assert_eq!(commands.len(), 1);
        let keys: Vec<_> = rejected.iter().map(|entry| entry.keys.as_str()).collect();
        assert_eq!(keys, ["", "g bogus"]);
        assert!(rejected[1].reason.contains("bogus"), "{}", rejected[1].reason);
    }
}
