use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use log::debug;
use serde::Serialize;
use serde_json::json;

use crate::model::{Credentials, MatchResult, ModelError, PhotoFile};
use crate::runtime::{AppContext, AppError, Flow, init_logging, resolve_config, save_config};
use crate::workflow::{AppShell, Dispatch, NoticeKind};

use super::types::{Cli, Commands, MatchInfo, SearchInfo, SessionInfo, SignIn};

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    init_logging(if cli.verbose { "debug" } else { "warn" });
    let config = resolve_config(cli.config.as_deref(), cli.api_url.as_deref())
        .map_err(|error| error.to_string())?;

    match cli.command {
        Commands::Gui => crate::ui::run(config),
        Commands::Config { output } => match output {
            Some(path) => {
                save_config(&path, &config).map_err(|error| error.to_string())?;
                println!("{}", json!({"status": "ok", "output": path}));
                Ok(())
            }
            None => print_json(&config),
        },
        Commands::Health => {
            let app = AppContext::new(config).map_err(|error| error.to_string())?;
            let report = app.health().map_err(|error| error.to_string())?;
            print_json(&report)
        }
        command => {
            let app = AppContext::new(config).map_err(|error| error.to_string())?;
            Terminal::new(&app).run(command)
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).map_err(|error| error.to_string())?
    );
    Ok(())
}

/// Drives one shell to completion for a single command.
struct Terminal {
    shell: AppShell,
    wait: Duration,
    printed: u64,
}

impl Terminal {
    fn new(app: &AppContext) -> Self {
        Self {
            shell: app.shell(Flow::Lite),
            wait: app.config().request_timeout() * 3,
            printed: 0,
        }
    }

    fn run(mut self, command: Commands) -> Result<(), String> {
        let dispatch = self.shell.start();
        self.settle(dispatch)?;

        match command {
            Commands::Session => {
                let state = self.shell.state();
                print_json(&SessionInfo {
                    logged_in: state.session().is_authenticated(),
                    username: state.identity().map(str::to_string),
                })
            }
            Commands::Login { auth } => {
                self.sign_in(auth)?;
                print_json(&json!({"username": self.shell.state().identity()}))
            }
            Commands::Register { auth } => {
                let credentials = Credentials::new(auth.username, auth.password);
                let dispatch = self.shell.register(credentials);
                self.settle(dispatch)
            }
            Commands::Upload { auth, files } => {
                self.sign_in(auth)?;
                let photos = files
                    .iter()
                    .map(PhotoFile::from_path)
                    .collect::<Result<Vec<_>, ModelError>>()
                    .map_err(|error| error.to_string())?;
                let dispatch = self.shell.upload(photos);
                self.settle(dispatch)
            }
            Commands::Search {
                auth,
                file,
                save_dir,
            } => {
                self.sign_in(auth)?;
                let probe = PhotoFile::from_path(&file).map_err(|error| error.to_string())?;
                let dispatch = self.shell.search(Some(probe));
                self.settle(dispatch)?;
                self.report_search(save_dir.as_deref())
            }
            Commands::UpdateCache { auth } => {
                self.sign_in(auth)?;
                let dispatch = self.shell.update_cache();
                self.settle(dispatch)
            }
            Commands::Stats { auth } => {
                self.sign_in(auth)?;
                let dispatch = self.shell.refresh_stats();
                self.settle(dispatch)?;
                let stats = self
                    .shell
                    .state()
                    .stats()
                    .ok_or_else(|| "album stats are unavailable".to_string())?;
                print_json(stats)
            }
            Commands::Delete { auth, filename } => {
                self.sign_in(auth)?;
                let dispatch = self.shell.delete_photo(&filename);
                self.settle(dispatch)
            }
            Commands::Logout { auth } => {
                self.sign_in(auth)?;
                let dispatch = self.shell.logout();
                self.settle(dispatch)
            }
            Commands::Health | Commands::Config { .. } | Commands::Gui => Ok(()),
        }
    }

    fn sign_in(&mut self, auth: SignIn) -> Result<(), String> {
        if self.shell.state().session().is_authenticated() {
            return Ok(());
        }
        let dispatch = self
            .shell
            .login(Credentials::new(auth.username, auth.password));
        self.settle(dispatch)?;
        match self.shell.state().identity() {
            Some(identity) => {
                debug!("signed in as {identity}");
                Ok(())
            }
            None => Err("sign-in failed".to_string()),
        }
    }

    /// Waits for the dispatched job and anything it chained, then prints the
    /// newest notice. An error notice fails the command.
    fn settle(&mut self, dispatch: Dispatch) -> Result<(), String> {
        match dispatch {
            Dispatch::Started(ticket) => {
                if !self.shell.wait_idle(self.wait) {
                    return Err(format!("timed out waiting for {}", ticket.kind.label()));
                }
            }
            Dispatch::Skipped | Dispatch::Rejected(_) => {}
            Dispatch::Busy => return Err("another request is still running".to_string()),
            Dispatch::NotPermitted => return Err("not signed in".to_string()),
        }
        self.print_notice()
    }

    fn print_notice(&mut self) -> Result<(), String> {
        let Some(notice) = self.shell.state().notifications().current() else {
            return Ok(());
        };
        if notice.sequence <= self.printed {
            return Ok(());
        }
        self.printed = notice.sequence;
        let line = format!("[{}] {}", notice.kind.as_str(), notice.text);
        if notice.kind == NoticeKind::Error {
            return Err(line);
        }
        println!("{line}");
        Ok(())
    }

    fn report_search(&self, save_dir: Option<&Path>) -> Result<(), String> {
        let state = self.shell.state();
        if let Some(dir) = save_dir {
            fs::create_dir_all(dir).map_err(|error| error.to_string())?;
        }
        let matches = state
            .results()
            .matches()
            .iter()
            .enumerate()
            .map(|(index, found)| {
                let saved_to = match save_dir {
                    Some(dir) => {
                        Some(save_original(dir, found).map_err(|error| error.to_string())?)
                    }
                    None => None,
                };
                Ok(MatchInfo {
                    rank: index + 1,
                    filename: found.display_name(),
                    similarity: found.similarity(),
                    saved_to,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;
        let outcome = state.last_search();
        print_json(&SearchInfo {
            match_found: outcome.is_some_and(|outcome| outcome.match_found),
            message: outcome.map(|outcome| outcome.message.clone()),
            matches,
        })
    }
}

fn save_original(dir: &Path, found: &MatchResult) -> Result<PathBuf, AppError> {
    let decoded = found.original.decode()?;
    let name = found.display_name();
    let base = Path::new(&name)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("match.{}", decoded.extension()));
    let path = dir.join(format!("original_{base}"));
    fs::write(&path, &decoded.bytes).map_err(ModelError::from)?;
    Ok(path)
}
