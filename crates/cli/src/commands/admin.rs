//! Moderation commands, executed as a logged-in admin

use anyhow::{Context, Result};
use careswap_business::{AccountService, ModerationService, ServiceContext, Session};
use careswap_core::{User, UserId};

use crate::AdminAuth;

/// Log the admin in and return the resulting session
async fn login(ctx: &ServiceContext, auth: &AdminAuth) -> Result<Session> {
    let mut session = Session::new();
    AccountService::new(ctx)
        .admin_login(&mut session, &auth.admin, &auth.password)
        .await
        .context("Admin login failed")?;
    Ok(session)
}

fn print_outcome(action: &str, user: &User) {
    println!("✅ {} applied to #{} {} <{}>", action, user.id, user.name, user.email);
    print!("   Standing: {}", user.standing);
    if let Some(until) = user.timeout_until() {
        print!(" until {}", until.format("%Y-%m-%d %H:%M UTC"));
    }
    if let Some(reason) = user.ban_reason() {
        print!(" ({})", reason);
    }
    println!();
}

pub async fn ban(ctx: &ServiceContext, auth: &AdminAuth, user_id: u64, reason: Option<&str>) -> Result<()> {
    let session = login(ctx, auth).await?;
    let user = ModerationService::new(ctx)
        .ban(&session, UserId(user_id), reason)
        .await
        .context("Ban failed")?;
    print_outcome("Ban", &user);
    Ok(())
}

pub async fn unban(ctx: &ServiceContext, auth: &AdminAuth, user_id: u64) -> Result<()> {
    let session = login(ctx, auth).await?;
    let user = ModerationService::new(ctx)
        .unban(&session, UserId(user_id))
        .await
        .context("Unban failed")?;
    print_outcome("Unban", &user);
    Ok(())
}

pub async fn timeout(
    ctx: &ServiceContext,
    auth: &AdminAuth,
    user_id: u64,
    hours: Option<u32>,
    reason: Option<&str>,
) -> Result<()> {
    let session = login(ctx, auth).await?;
    let user = ModerationService::new(ctx)
        .timeout(&session, UserId(user_id), hours, reason)
        .await
        .context("Timeout failed")?;
    print_outcome("Timeout", &user);
    Ok(())
}

pub async fn kick(ctx: &ServiceContext, auth: &AdminAuth, user_id: u64) -> Result<()> {
    let session = login(ctx, auth).await?;
    let user = ModerationService::new(ctx)
        .kick(&session, UserId(user_id))
        .await
        .context("Kick failed")?;
    print_outcome("Kick", &user);
    Ok(())
}

pub async fn warn(ctx: &ServiceContext, auth: &AdminAuth, user_id: u64, message: Option<&str>) -> Result<()> {
    let session = login(ctx, auth).await?;
    let user = ModerationService::new(ctx)
        .warn(&session, UserId(user_id), message)
        .await
        .context("Warning failed")?;
    print_outcome("Warning", &user);
    Ok(())
}

/// Print the moderation log, newest last
pub async fn logs(ctx: &ServiceContext, auth: &AdminAuth, limit: Option<usize>) -> Result<()> {
    let session = login(ctx, auth).await?;
    let entries = ModerationService::new(ctx)
        .logs(&session)
        .await
        .context("Failed to read moderation log")?;

    let skip = limit.map_or(0, |n| entries.len().saturating_sub(n));
    if entries.is_empty() {
        println!("📜 Moderation log is empty");
        return Ok(());
    }

    println!("📜 Moderation log ({} of {})", entries.len() - skip, entries.len());
    for entry in entries.iter().skip(skip) {
        println!("   {}", entry);
    }
    Ok(())
}
