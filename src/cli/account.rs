use std::{
    io::{self, Write},
    sync::Arc,
};

use clap::Args;
use storefront::auth::Session;

use crate::cli::Context;

#[derive(Debug, Args)]
pub(crate) struct SignInArgs {
    /// Email address
    #[arg(long)]
    email: String,

    /// Password
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Debug, Args)]
pub(crate) struct SignUpArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// Email address
    #[arg(long)]
    email: String,

    /// Password
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: String,
}

fn session(ctx: &Context) -> Session {
    Session::restore(Arc::clone(&ctx.storage)).with_latency(ctx.config.auth_latency())
}

pub(crate) async fn sign_in(ctx: &Context, args: SignInArgs) -> anyhow::Result<()> {
    let mut session = session(ctx);
    let user = session.sign_in(&args.email, &args.password).await?;

    writeln!(io::stdout(), "Signed in as {} <{}>", user.name, user.email)?;

    Ok(())
}

pub(crate) async fn sign_up(ctx: &Context, args: SignUpArgs) -> anyhow::Result<()> {
    let mut session = session(ctx);
    let user = session
        .sign_up(&args.name, &args.email, &args.password)
        .await?;

    writeln!(io::stdout(), "Welcome, {} <{}>", user.name, user.email)?;

    Ok(())
}

pub(crate) fn sign_out(ctx: &Context) -> anyhow::Result<()> {
    session(ctx).sign_out()?;

    writeln!(io::stdout(), "Signed out.")?;

    Ok(())
}

pub(crate) fn whoami(ctx: &Context) -> anyhow::Result<()> {
    let mut out = io::stdout();

    match session(ctx).user() {
        Some(user) => writeln!(out, "{} <{}> (id {})", user.name, user.email, user.id)?,
        None => writeln!(out, "Not signed in.")?,
    }

    Ok(())
}
