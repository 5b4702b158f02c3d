//! List command

use anyhow::Result;
use dnvm_core::Manifest;
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::output;

#[derive(Debug, PartialEq, Eq, Tabled)]
struct SdkRow {
    #[tabled(rename = "")]
    current: &'static str,
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Location")]
    location: String,
}

/// One row per installed SDK, sorted by directory then version. The channel
/// column names every tracked channel that installed that version there.
fn rows(manifest: &Manifest) -> Vec<SdkRow> {
    let mut sdks: Vec<_> = manifest.installed_sdk_versions.iter().collect();
    sdks.sort_by(|a, b| {
        a.sdk_dir_name
            .cmp(&b.sdk_dir_name)
            .then_with(|| a.version.cmp(&b.version))
    });

    sdks.into_iter()
        .map(|sdk| {
            let channels: Vec<String> = manifest
                .tracked_channels
                .iter()
                .filter(|t| {
                    t.sdk_dir_name == sdk.sdk_dir_name
                        && t.installed_sdk_versions.contains(&sdk.version)
                })
                .map(|t| t.channel_name.to_string())
                .collect();

            SdkRow {
                current: if sdk.sdk_dir_name == manifest.current_sdk_dir {
                    "*"
                } else {
                    ""
                },
                channel: channels.join(", "),
                version: sdk.version.to_string(),
                location: sdk.sdk_dir_name.to_string(),
            }
        })
        .collect()
}

fn render(manifest: &Manifest) -> String {
    let mut table = Table::new(rows(manifest));
    table.with(Style::sharp());
    table.to_string()
}

pub fn run(ctx: &Context) -> Result<()> {
    let manifest = ctx.home.manifest_store().read_or_empty()?;

    if manifest.installed_sdk_versions.is_empty() {
        output::info("No SDKs installed. Run 'dnvm install <channel>' to install one");
        return Ok(());
    }

    output::kv("Home", &ctx.home.root().display().to_string());
    println!("Installed SDKs:\n");
    println!("{}", render(&manifest));

    let untracked: Vec<String> = manifest
        .tracked_channels
        .iter()
        .filter(|t| t.installed_sdk_versions.is_empty())
        .map(|t| format!("{} ({})", t.channel_name, t.sdk_dir_name))
        .collect();
    if !untracked.is_empty() {
        output::info(&format!("Tracked with nothing installed: {}", untracked.join(", ")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnvm_core::{Channel, InstalledSdk, SdkDirName};
    use semver::Version;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_rows_mark_current_and_channels() {
        let preview = SdkDirName::new("preview").unwrap();
        let manifest = Manifest::empty()
            .add_sdk(InstalledSdk::new(v("8.0.100")), Channel::Lts)
            .add_sdk(InstalledSdk::new(v("8.0.100")), Channel::Latest)
            .add_sdk(InstalledSdk::in_dir(v("9.0.100-preview.1"), preview), Channel::Preview);

        let rows = rows(&manifest);
        assert_eq!(
            rows,
            vec![
                SdkRow {
                    current: "*",
                    channel: "lts, latest".to_string(),
                    version: "8.0.100".to_string(),
                    location: "dn".to_string(),
                },
                SdkRow {
                    current: "",
                    channel: "preview".to_string(),
                    version: "9.0.100-preview.1".to_string(),
                    location: "preview".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_render_table() {
        let preview = SdkDirName::new("preview").unwrap();
        let manifest = Manifest::empty()
            .add_sdk(InstalledSdk::new(v("1.0.0")), Channel::Latest)
            .add_sdk(InstalledSdk::in_dir(v("4.0.0-preview1"), preview), Channel::Preview);

        let expected = "\
┌───┬─────────┬────────────────┬──────────┐
│   │ Channel │ Version        │ Location │
├───┼─────────┼────────────────┼──────────┤
│ * │ latest  │ 1.0.0          │ dn       │
│   │ preview │ 4.0.0-preview1 │ preview  │
└───┴─────────┴────────────────┴──────────┘";
        assert_eq!(render(&manifest), expected);
    }

    #[test]
    fn test_rows_sorted_by_version_within_dir() {
        let manifest = Manifest::empty()
            .add_sdk(InstalledSdk::new(v("8.0.200")), Channel::Lts)
            .add_sdk(InstalledSdk::new(v("6.0.400")), Channel::Versioned { major: 6, minor: 0 });

        let versions: Vec<String> = rows(&manifest).into_iter().map(|r| r.version).collect();
        assert_eq!(versions, vec!["6.0.400", "8.0.200"]);
    }
}
