//! roller show command

use crate::Context;
use catalog::CatalogEntry;
use clap::Args;
use console::style;

#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Role key as listed by `roller cache`, e.g. `Prod/admin`
    pub key: String,
}

impl ShowCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let catalog = ctx.build_catalog()?;
        let entry = catalog.lookup(&self.key)?;

        println!("{}", render(&self.key, entry));
        Ok(())
    }
}

fn render(key: &str, entry: &CatalogEntry) -> String {
    let params = &entry.profile.parameters;
    let or_unset = |value: &str| {
        if value.is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        }
    };

    [
        style(key).bold().to_string(),
        format!("  name:         {}", entry.profile.name),
        format!("  account:      {}", or_unset(&params.account_id)),
        format!("  role:         {}", or_unset(&params.role)),
        format!("  from profile: {}", or_unset(&params.from_profile)),
        format!("  ttl:          {}", or_unset(&params.ttl)),
        format!("  source:       {}", entry.source_name),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{RawProfile, RoleParameters};

    #[test]
    fn test_render() {
        console::set_colors_enabled(false);
        let entry = CatalogEntry {
            profile: RawProfile::new("Prod", RoleParameters::new("111", "admin")).with_from_profile("root"),
            source_name: "team".to_string(),
        };

        let rendered = render("Prod/admin", &entry);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "Prod/admin");
        assert_eq!(lines[2], "  account:      111");
        assert_eq!(lines[4], "  from profile: root");
        assert_eq!(lines[5], "  ttl:          -");
        assert_eq!(lines[6], "  source:       team");
    }
}
