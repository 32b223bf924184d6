//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `notekeep_core` linkage.
//! - Wire config, logging, storage and services together and run one
//!   register → login → note → favorite → delete round against an in-memory
//!   database, printing each step as JSON.
//!
//! Usage: `notekeep_cli [ping|smoke]` (default `ping`).

use log::info;
use notekeep_core::{
    open_db_in_memory, AccountService, Argon2PasswordHasher, CoreConfig, FavoriteService,
    HmacTokenAuthenticator, NewNote, NoopSummarizer, NoteService, RegisterRequest, RequestScope,
    TagService,
};
use serde_json::json;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let command = std::env::args().nth(1).unwrap_or_else(|| "ping".to_string());
    let result = match command.as_str() {
        "ping" => {
            println!("notekeep_core ping={}", notekeep_core::ping());
            println!("notekeep_core version={}", notekeep_core::core_version());
            Ok(())
        }
        "smoke" => run_smoke(),
        other => {
            eprintln!("unknown command `{other}`; expected `ping` or `smoke`");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_smoke() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    if config.logging.log_dir.is_some() {
        notekeep_core::init_logging(&config.logging)?;
    }
    info!("event=cli_smoke module=cli status=start");

    let mut conn = open_db_in_memory(&config.db)?;
    let accounts = AccountService::new(
        Box::new(Argon2PasswordHasher::new()),
        Box::new(HmacTokenAuthenticator::new(&config.auth)),
    );
    let notes = NoteService::new(config.query, Box::new(NoopSummarizer));
    let tags = TagService::new();
    let favorites = FavoriteService::new(config.query);

    let mut scope = RequestScope::new(&mut conn);
    let registered = accounts.register(
        &mut scope,
        &RegisterRequest {
            username: "smoke".to_string(),
            email: "smoke@example.com".to_string(),
            password: "smoke-password".to_string(),
        },
    )?;
    print_step("register", &registered)?;

    let token = accounts.login(&mut scope, "smoke@example.com", "smoke-password")?;
    let user = accounts.authenticate(&mut scope, &token.access_token)?;
    print_step("me", &accounts.me(&mut scope, &user)?)?;

    let work = tags.create_tag(&mut scope, &user, "work")?;
    let note = notes.create_note(
        &mut scope,
        &user,
        NewNote::new("Quarterly budget review", "Numbers for Q3").with_tags(vec![work.id]),
    )?;
    print_step("create_note", &note)?;

    favorites.add_favorite(&mut scope, &user, note.id)?;
    print_step("get_note", &notes.get_note(&mut scope, &user, note.id)?)?;
    print_step(
        "search",
        &notes.search_notes(&mut scope, &user, "budget", 0, None)?,
    )?;

    notes.delete_note(&mut scope, &user, note.id)?;
    print_step("after_delete", &notes.get_note(&mut scope, &user, note.id)?)?;

    info!("event=cli_smoke module=cli status=ok");
    Ok(())
}

fn print_step(step: &str, value: &impl serde::Serialize) -> Result<(), Box<dyn Error>> {
    println!("{}", json!({ "step": step, "result": serde_json::to_value(value)? }));
    Ok(())
}
