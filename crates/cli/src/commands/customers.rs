//! `list`, `preview`, `send` and `link`.

#![allow(clippy::print_stdout)]

use refund_desk::outreach::build_message;
use refund_desk::{DeskConfig, DeskError, HttpPanelApi, Outreach, Roster, SendOutcome};
use refund_desk_core::{CustomerRecord, StatusFilter};
use tracing::info;

use super::Context;
use crate::table;

/// Print the roster for `filter`.
///
/// # Errors
///
/// Returns `DeskError` if no session is stored or the fetch fails.
pub async fn list(config: &DeskConfig, filter: StatusFilter) -> Result<(), DeskError> {
    let ctx = Context::restore(config)?;
    let roster = Roster::new(ctx.api.clone(), ctx.notifier.clone());
    roster.fetch_all(&ctx.session, filter).await?;

    let outreach = outreach(config, &ctx);
    println!("Filtro: {}", filter.label());
    let rendered = table::render(&roster.records(), |status| {
        outreach.is_action_enabled(status)
    });
    println!("{rendered}");
    Ok(())
}

/// Print the messages `key` would receive, without sending anything.
///
/// # Errors
///
/// Returns `DeskError` if no session is stored, the fetch fails or no record matches.
pub async fn preview(config: &DeskConfig, key: &str) -> Result<(), DeskError> {
    let ctx = Context::restore(config)?;
    let (_, customer) = load(&ctx, key).await?;
    let outreach = outreach(config, &ctx);

    println!("Para: {}", outreach.destination(&customer));
    for (part, text) in build_message(&customer).iter().enumerate() {
        println!("\n[{}] {text}", part + 1);
    }
    Ok(())
}

/// Message `key` and mark the purchase refunded.
///
/// # Errors
///
/// Returns `DeskError` if no session is stored, the fetch fails, no record
/// matches or the send fails.
pub async fn send(config: &DeskConfig, key: &str) -> Result<(), DeskError> {
    let ctx = Context::restore(config)?;
    let (roster, customer) = load(&ctx, key).await?;
    let outreach = outreach(config, &ctx);

    match outreach.send(&ctx.session, &roster, &customer).await? {
        SendOutcome::Sent { messages } => {
            info!(id = %customer.id, messages, "Refund message sent");
        }
        SendOutcome::Skipped(status) => {
            info!(id = %customer.id, status = status.label(), "Nothing to send for this status");
        }
    }
    Ok(())
}

/// Print the pre-filled web messaging link for `key`, optionally opening it.
///
/// # Errors
///
/// Returns `DeskError` if no session is stored, the fetch fails, no record
/// matches or the link cannot be opened.
pub async fn link(config: &DeskConfig, key: &str, open: bool) -> Result<(), DeskError> {
    let ctx = Context::restore(config)?;
    let (_, customer) = load(&ctx, key).await?;
    let outreach = outreach(config, &ctx);

    let link = if open {
        outreach.send_via_external_link(&customer)?
    } else {
        outreach.external_link(&customer)
    };
    println!("{link}");
    Ok(())
}

fn outreach(config: &DeskConfig, ctx: &Context) -> Outreach<HttpPanelApi> {
    Outreach::new(
        ctx.api.clone(),
        ctx.notifier.clone(),
        config.outreach_settings(),
    )
}

/// Fetch every customer and pick the one with id or code `key`.
async fn load(
    ctx: &Context,
    key: &str,
) -> Result<(Roster<HttpPanelApi>, CustomerRecord), DeskError> {
    let roster = Roster::new(ctx.api.clone(), ctx.notifier.clone());
    roster.fetch_all(&ctx.session, StatusFilter::All).await?;
    let customer = roster
        .find(key)
        .ok_or_else(|| DeskError::NotFound(key.to_string()))?;
    Ok((roster, customer))
}
