//! Profile loading and CLI-over-profile resolution.
//!
//! Precedence everywhere: CLI flag, then profile, then built-in default.

use std::path::Path;

use anyhow::{Context, Result};
use ptreval_config as cli;
use ptreval_config::{DEFAULT_PROFILES_FILE, Profile, ProfilesFile};
use ptreval_discover::DiscoverOptions;
use tracing::{debug, info};

pub(crate) fn load_profiles(explicit: Option<&Path>) -> Result<ProfilesFile> {
    if let Some(path) = explicit {
        return ProfilesFile::from_file(path)
            .with_context(|| format!("Failed to load profiles from {}", path.display()));
    }
    let path = Path::new(DEFAULT_PROFILES_FILE);
    if path.is_file() {
        ProfilesFile::from_file(path)
            .with_context(|| format!("Failed to load profiles from {}", path.display()))
    } else {
        debug!("no {DEFAULT_PROFILES_FILE} in the working directory, using the built-in profile");
        Ok(ProfilesFile::default())
    }
}

pub(crate) fn resolve_profile(global: &cli::GlobalArgs) -> Result<Profile> {
    let file = load_profiles(global.profiles.as_deref())?;
    let profile = file.get(global.profile.as_deref())?.clone();
    info!(
        profile = %profile.name,
        configs = ?profile.config_names(),
        "using profile"
    );
    Ok(profile)
}

pub(crate) fn resolve_discover(args: &cli::DiscoverArgs, profile: &Profile) -> DiscoverOptions {
    let defaults = DiscoverOptions::default();
    let from_profile = &profile.discover;
    DiscoverOptions {
        extensions: if args.extensions.is_empty() {
            from_profile
                .extensions
                .clone()
                .unwrap_or(defaults.extensions)
        } else {
            args.extensions.clone()
        },
        comment_marker: args
            .comment_marker
            .or(from_profile.comment_marker)
            .unwrap_or(defaults.comment_marker),
        include_pattern: args
            .include_pattern
            .clone()
            .or_else(|| from_profile.include_pattern.clone())
            .unwrap_or(defaults.include_pattern),
        max_include_depth: args
            .max_include_depth
            .or(from_profile.max_include_depth)
            .unwrap_or(defaults.max_include_depth),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DistributeSettings {
    pub seed: String,
    pub buckets: usize,
    pub limit: Option<usize>,
}

pub(crate) fn resolve_distribute(args: &cli::DistributeArgs, profile: &Profile) -> DistributeSettings {
    DistributeSettings {
        seed: args.seed.clone().unwrap_or_else(|| profile.seed.clone()),
        buckets: args.buckets.unwrap_or_else(|| profile.bucket_count()),
        limit: args.limit.or(profile.limit),
    }
}

pub(crate) fn per_file_comparison(args: &cli::CompareArgs, profile: &Profile) -> bool {
    args.per_file || profile.per_file_comparison
}
