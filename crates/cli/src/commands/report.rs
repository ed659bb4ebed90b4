//! Read-only reports and seeding

use anyhow::{Context, Result};
use careswap_business::{seed_demo_data, RequestService, ServiceContext};
use careswap_core::RequestStatus;
use careswap_persistence::RequestFilter;

pub async fn seed(ctx: &ServiceContext) -> Result<()> {
    let summary = seed_demo_data(ctx).await.context("Failed to seed demo data")?;
    if summary.is_empty() {
        println!("🌱 Demo data already present");
    } else {
        println!(
            "🌱 Seeded {} users, {} admins, {} requests",
            summary.users, summary.admins, summary.requests
        );
    }
    Ok(())
}

pub async fn status(ctx: &ServiceContext, location: &str) -> Result<()> {
    let store = ctx.store();
    let stats = RequestService::new(ctx).platform_stats().await?;
    let admins = store.list_admins().await?.len();
    let in_progress = store
        .list_requests(RequestFilter::Status(RequestStatus::InProgress))
        .await?
        .len();
    let logs = store.list_logs().await?.len();

    println!("📊 CareSwap Status");
    println!("   Store: {}", location);
    println!();
    println!("   Users:           {}", stats.users);
    println!("   Admins:          {}", admins);
    println!("   Open requests:   {}", stats.open_requests);
    println!("   In progress:     {}", in_progress);
    println!("   Completed tasks: {}", stats.completed_tasks);
    println!("   Log entries:     {}", logs);
    Ok(())
}

pub async fn users(ctx: &ServiceContext) -> Result<()> {
    let users = ctx.store().list_users().await.context("Failed to list users")?;
    if users.is_empty() {
        println!("No users yet");
        return Ok(());
    }

    println!("{:<5} {:<28} {:<22} {:<7} {:>7} {:>5}  {}", "ID", "Email", "Name", "Cohort", "Points", "Level", "Standing");
    for user in &users {
        println!(
            "{:<5} {:<28} {:<22} {:<7} {:>7} {:>5}  {}",
            user.id.to_string(),
            user.email,
            user.name,
            user.cohort.as_str(),
            user.aura_points,
            user.level(),
            user.standing
        );
    }
    Ok(())
}

pub async fn requests(ctx: &ServiceContext, status: Option<RequestStatus>) -> Result<()> {
    let filter = status.map_or(RequestFilter::All, RequestFilter::Status);
    let requests = ctx
        .store()
        .list_requests(filter)
        .await
        .context("Failed to list requests")?;
    if requests.is_empty() {
        println!("No requests");
        return Ok(());
    }

    for request in &requests {
        println!(
            "#{} [{}] {} ({} pts, {}, {})",
            request.id,
            request.status,
            request.title,
            request.aura_points,
            request.difficulty,
            request.user_type
        );
        print!("   posted by #{} on {} at {}", request.posted_by, request.posted_date, request.location);
        if let Some(helper) = request.accepted_by {
            print!(", accepted by #{}", helper);
        }
        println!();
    }
    Ok(())
}
