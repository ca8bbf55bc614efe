//! Command handlers for the contacts CLI

use std::collections::HashSet;
use std::path::PathBuf;

use contacts_core::{
    DataAccess, ExportDestination, ExportRequest, PipelineError, SettingsStore, TabKind,
};
use contacts_runtime::{ExportStatus, ImportStatus, RefreshOutcome};
use tracing::{debug, info, warn};

use crate::app::ContactsApp;
use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::{CliError, Result};

/// Command dispatcher for handling CLI commands
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Execute a CLI command
    pub async fn execute(cli: Cli, config: AppConfig) -> Result<()> {
        let data_dir = config.data_dir()?;
        match cli.command {
            Commands::List { tab, search } => {
                let app = ContactsApp::new(&config, data_dir, None)?;
                Self::handle_list_command(app, tab, search).await
            }
            Commands::Import { locator } => {
                let app = ContactsApp::new(&config, data_dir, None)?;
                Self::handle_import_command(app, locator).await
            }
            Commands::Export { output, exclude } => {
                let app = ContactsApp::new(&config, data_dir, None)?;
                Self::handle_export_command(app, output, exclude).await
            }
            Commands::Status => {
                let app = ContactsApp::new(&config, data_dir, None)?;
                Self::handle_status_command(app).await
            }
            Commands::Interactive { open } => {
                let app = ContactsApp::new(&config, data_dir, open)?;
                Self::handle_interactive_command(app).await
            }
        }
    }

    async fn started(mut app: ContactsApp) -> Result<ContactsApp> {
        if !app.start().await {
            app.stop().await;
            return Err(CliError::Pipeline(PipelineError::PermissionDenied {
                permission: contacts_core::Permission::ReadContacts,
            }));
        }
        Ok(app)
    }

    /// Handle the list command
    async fn handle_list_command(
        app: ContactsApp,
        tab: Option<TabKind>,
        search: Option<String>,
    ) -> Result<()> {
        let mut app = Self::started(app).await?;

        if let Some(tab) = tab {
            let shown = app.settings().snapshot().show_tabs;
            let index = shown.position_of(tab).ok_or_else(|| {
                CliError::InvalidInput(format!("tab {} is not shown (tabs: {:?})", tab, shown))
            })?;
            app.controller().select_tab(index).await;
        }
        if let Some(query) = search {
            app.controller().open_search().await;
            app.controller().search_query_changed(&query).await;
        }

        for line in app.current_lines().await {
            println!("{}", line);
        }

        app.stop().await;
        Ok(())
    }

    /// Handle the import command
    async fn handle_import_command(app: ContactsApp, locator: String) -> Result<()> {
        let mut app = Self::started(app).await?;
        let result = app.controller().import_from(&locator).await;
        app.stop().await;

        match Self::settle(result)? {
            Some(ImportStatus::Imported) => info!("Import of {} finished", locator),
            Some(ImportStatus::Declined) => println!("Nothing imported"),
            Some(ImportStatus::Cancelled) => println!("Import cancelled"),
            None => {}
        }
        Ok(())
    }

    /// Handle the export command
    async fn handle_export_command(
        app: ContactsApp,
        output: PathBuf,
        exclude: Vec<String>,
    ) -> Result<()> {
        let mut app = Self::started(app).await?;
        let request = ExportRequest {
            destination: ExportDestination::new(output),
            excluded_sources: exclude.into_iter().collect::<HashSet<_>>(),
        };
        let result = app.controller().export_to(request).await;
        app.stop().await;

        match Self::settle(result)? {
            Some(ExportStatus::Written(outcome)) => {
                outcome.into_result().map_err(CliError::Reported)?
            }
            Some(ExportStatus::Cancelled) => println!("Export cancelled"),
            None => {}
        }
        Ok(())
    }

    /// Pipelines notify the user themselves: a silent failure ends the
    /// command normally, any other is only turned into an exit status
    fn settle<T>(result: std::result::Result<T, PipelineError>) -> Result<Option<T>> {
        match result {
            Ok(status) => Ok(Some(status)),
            Err(e) if e.is_silent() => {
                debug!("Pipeline aborted without notice: {}", e);
                Ok(None)
            }
            Err(e) => Err(CliError::Reported(e)),
        }
    }

    /// Handle the status command
    async fn handle_status_command(app: ContactsApp) -> Result<()> {
        let mut app = Self::started(app).await?;

        let snapshot = app.settings().snapshot();
        let contacts = app
            .store()
            .load_contacts()
            .await
            .map_err(contacts_core::ContactsError::from)?;
        let sources = app
            .store()
            .sources()
            .await
            .map_err(contacts_core::ContactsError::from)?;
        let stats = app.controller().coordinator().stats();

        println!("=== Contacts Status ===");
        println!("Data directory: {}", app.data_dir().display());
        println!("Settings file: {}", app.settings().path().display());
        println!("Contacts file: {}", app.store().path().display());
        println!("Contacts: {}", contacts.len());
        println!("Sources: {}", sources.join(", "));
        println!("Tabs: {:?}", snapshot.show_tabs);
        if let Some(tab) = app.controller().current_tab().await {
            println!("Current tab: {}", tab);
        }
        if let Some(path) = app.settings().last_export_path() {
            println!("Last export folder: {}", path.display());
        }
        println!(
            "Loads: {} started, {} completed, {} coalesced",
            stats.loads_started, stats.loads_completed, stats.requests_coalesced
        );

        app.stop().await;
        Ok(())
    }

    /// Handle the interactive command
    async fn handle_interactive_command(app: ContactsApp) -> Result<()> {
        let mut app = Self::started(app).await?;
        println!("Type 'help' for commands.");
        Self::print_current(&app).await;

        loop {
            let Some(line) = app.prompt().ask("contacts> ").await else {
                break;
            };
            if line.is_empty() {
                continue;
            }

            let command = match SessionCommand::parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };
            debug!("Session command: {:?}", command);

            if command == SessionCommand::Quit {
                break;
            }
            Self::run_session_command(&mut app, command).await;
        }

        app.stop().await;
        Ok(())
    }

    async fn run_session_command(app: &mut ContactsApp, command: SessionCommand) {
        match command {
            SessionCommand::Help => {
                println!("{}", SessionCommand::HELP);
                return;
            }
            SessionCommand::Tab(target) => {
                let shown = app.settings().snapshot().show_tabs;
                let index = match target {
                    TabTarget::Index(index) => Some(index),
                    TabTarget::Kind(kind) => shown.position_of(kind),
                };
                let selected = match index {
                    Some(index) => app.controller().select_tab(index).await,
                    None => false,
                };
                if !selected {
                    println!("No such tab (tabs: {:?})", shown);
                    return;
                }
            }
            SessionCommand::Search(query) => {
                app.controller().open_search().await;
                app.controller().search_query_changed(&query).await;
            }
            SessionCommand::CloseSearch => app.controller().close_search().await,
            SessionCommand::Import(locator) => {
                let result = match locator {
                    Some(locator) => app.controller().import_from(&locator).await,
                    None => app.controller().import_interactive().await,
                };
                if let Err(e) = result {
                    debug!("Import ended with {}", e);
                }
            }
            SessionCommand::Export => {
                if let Err(e) = app.controller().export_interactive().await {
                    debug!("Export ended with {}", e);
                }
                return;
            }
            SessionCommand::Refresh => {
                Self::report_refresh(app.controller().sorting_changed().await);
            }
            SessionCommand::Pause => {
                app.controller_mut().on_pause().await;
                println!("Paused; edit settings and type 'resume'");
                return;
            }
            SessionCommand::Resume => {
                let action = app.controller_mut().on_resume().await;
                info!("Resume handled: {:?}", action);
            }
            SessionCommand::Stats => {
                let stats = app.controller().coordinator().stats();
                println!(
                    "loads started {}, completed {}, coalesced {}",
                    stats.loads_started, stats.loads_completed, stats.requests_coalesced
                );
                return;
            }
            SessionCommand::Quit => return,
        }
        Self::print_current(app).await;
    }

    fn report_refresh(outcome: RefreshOutcome) {
        match outcome {
            RefreshOutcome::LoadFailed { generation } => {
                warn!("Load {} failed; views keep their previous contents", generation)
            }
            other => debug!("Refresh: {:?}", other),
        }
    }

    async fn print_current(app: &ContactsApp) {
        if let Some(tab) = app.controller().current_tab().await {
            println!("--- {} ---", tab);
        }
        for line in app.current_lines().await {
            println!("  {}", line);
        }
    }
}

// ----------------------------------------------------------------------------
// Interactive session commands
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabTarget {
    Index(usize),
    Kind(TabKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Help,
    Tab(TabTarget),
    Search(String),
    CloseSearch,
    Import(Option<String>),
    Export,
    Refresh,
    Pause,
    Resume,
    Stats,
    Quit,
}

impl SessionCommand {
    pub const HELP: &'static str = "\
tab <n|name>     switch tab
search <query>   filter the current tab
close            close the search
import [loc]     import a path, file:// or content:// locator
export           export contacts
refresh          reload the contacts and favorites tabs
pause / resume   simulate leaving and returning to the browser
stats            refresh statistics
quit             leave the session";

    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "help" | "?" => SessionCommand::Help,
            "tab" => {
                if rest.is_empty() {
                    return Err(CliError::InvalidInput("tab needs an index or name".to_string()));
                }
                let target = match rest.parse::<usize>() {
                    Ok(index) => TabTarget::Index(index),
                    Err(_) => TabTarget::Kind(rest.parse().map_err(CliError::InvalidInput)?),
                };
                SessionCommand::Tab(target)
            }
            "search" | "/" => SessionCommand::Search(rest.to_string()),
            "close" => SessionCommand::CloseSearch,
            "import" => SessionCommand::Import((!rest.is_empty()).then(|| rest.to_string())),
            "export" => SessionCommand::Export,
            "refresh" | "sort" => SessionCommand::Refresh,
            "pause" => SessionCommand::Pause,
            "resume" => SessionCommand::Resume,
            "stats" => SessionCommand::Stats,
            "quit" | "exit" | "q" => SessionCommand::Quit,
            other => {
                return Err(CliError::InvalidInput(format!(
                    "unknown command '{}', try 'help'",
                    other
                )))
            }
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tab_targets() {
        assert_eq!(
            SessionCommand::parse("tab 2").unwrap(),
            SessionCommand::Tab(TabTarget::Index(2))
        );
        assert_eq!(
            SessionCommand::parse("TAB favorites").unwrap(),
            SessionCommand::Tab(TabTarget::Kind(TabKind::Favorites))
        );
        assert!(SessionCommand::parse("tab").is_err());
        assert!(SessionCommand::parse("tab recent").is_err());
    }

    #[test]
    fn test_parse_search_keeps_spaces() {
        assert_eq!(
            SessionCommand::parse("search  ada love ").unwrap(),
            SessionCommand::Search("ada love".to_string())
        );
    }

    #[test]
    fn test_parse_import_locator_is_optional() {
        assert_eq!(
            SessionCommand::parse("import").unwrap(),
            SessionCommand::Import(None)
        );
        assert_eq!(
            SessionCommand::parse("import content://downloads/7").unwrap(),
            SessionCommand::Import(Some("content://downloads/7".to_string()))
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(matches!(
            SessionCommand::parse("frobnicate"),
            Err(CliError::InvalidInput(_))
        ));
        assert_eq!(SessionCommand::parse("exit").unwrap(), SessionCommand::Quit);
    }
}
