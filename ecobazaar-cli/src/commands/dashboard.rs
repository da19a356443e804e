//! Dashboard command - overview and named panels as JSON

use anyhow::Result;
use clap::ValueEnum;

use ecobazaar_core::services::Audience;

use super::App;
use crate::output;

#[derive(Clone, Copy, ValueEnum)]
pub enum AudienceArg {
    User,
    Seller,
    Admin,
}

impl From<AudienceArg> for Audience {
    fn from(arg: AudienceArg) -> Self {
        match arg {
            AudienceArg::User => Audience::User,
            AudienceArg::Seller => Audience::Seller,
            AudienceArg::Admin => Audience::Admin,
        }
    }
}

pub async fn run(panel: Option<String>, audience: Option<AudienceArg>, list: bool) -> Result<()> {
    let app = App::open("/dashboard").await?;
    app.require_user()?;

    let audience = match audience {
        Some(arg) => Audience::from(arg),
        None => {
            let role = app.ctx.session.state().user.map(|u| u.role).unwrap_or_default();
            Audience::for_role(role)
        }
    };

    if list {
        for (name, _) in audience.panels() {
            println!("{}", name);
        }
        return Ok(());
    }

    let data = app.ctx.dashboard.panel(audience, panel.as_deref()).await?;
    app.report_redirects();
    output::json(&data)
}
