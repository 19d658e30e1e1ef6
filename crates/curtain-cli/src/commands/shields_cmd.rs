//! `curtain shields` -- show configured shield state.

use comfy_table::{Table, presets::UTF8_FULL};
use curtain_audit::{AuditConfig, Shield, ShieldStore};

use super::{SiteArgs, load_config};

/// Print the shield table for the resolved configuration.
pub fn run(args: &SiteArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["ID", "SHIELD", "OPTION", "STATE", "VERIFIED BY"]);

    for shield in Shield::ALL {
        table.add_row([
            shield.id().to_string(),
            shield.to_string(),
            shield.option_key().to_string(),
            shield_state(&config, shield).to_string(),
            verified_by(shield).to_string(),
        ]);
    }

    println!("{table}");
    let site = config.site.site_url.as_str();
    println!("  Site: {}", if site.is_empty() { "(not set)" } else { site });
    Ok(())
}

fn shield_state(config: &AuditConfig, shield: Shield) -> &'static str {
    if shield == Shield::Editor && config.hardening.disallow_file_edit {
        "hardcoded"
    } else if config.shields.shield_enabled(shield) {
        "enabled"
    } else {
        "disabled"
    }
}

fn verified_by(shield: Shield) -> &'static str {
    match shield {
        Shield::Xmlrpc => "POST xmlrpc.php",
        Shield::Enumeration => "GET /?author=1",
        Shield::RestUsers => "GET wp/v2/users",
        Shield::Version => "GET / (source scan)",
        Shield::Editor => "local check",
        Shield::LoginErrors => "POST login (fake user)",
    }
}
