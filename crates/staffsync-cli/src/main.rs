//! Staffsync CLI - inspect and maintain employees and skills

use std::time::Duration;

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use serde_json::json;
use staffsync_core::DataLayer;
use staffsync_core::config::{Config, TOKEN_ENV};
use staffsync_core::model::{Employee, EmployeeId, Skill, SkillId, SkillRef};
use staffsync_core::notice::Notice;
use staffsync_core::relations::{RosterQuery, SortColumn, SortSpec};
use staffsync_core::stores::FetchOutcome;
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "staffsync")]
#[command(author, version, about = "Employee and skill management", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage employees
    Employees {
        #[command(subcommand)]
        action: EmployeeAction,
    },

    /// Manage skills and assignments
    Skills {
        #[command(subcommand)]
        action: SkillAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

/// Options narrowing and ordering the employee list
#[derive(clap::Args, Clone)]
struct RosterArgs {
    /// Sort column (name, first_name, last_name, street, postcode, city, phone, id)
    #[arg(long, default_value = "name")]
    sort: SortColumn,
    /// Sort descending
    #[arg(long)]
    desc: bool,
    /// Only employees holding this skill id (repeatable, all must match)
    #[arg(long = "skill")]
    skills: Vec<SkillId>,
    /// Free-text filter over name, city and street
    #[arg(long)]
    filter: Option<String>,
}

impl RosterArgs {
    fn query(&self) -> RosterQuery {
        let sort = if self.desc {
            SortSpec::descending(self.sort)
        } else {
            SortSpec::ascending(self.sort)
        };
        RosterQuery::sorted(sort).with_text(self.filter.clone().unwrap_or_default())
    }
}

#[derive(Subcommand)]
enum EmployeeAction {
    /// List employees
    List {
        #[command(flatten)]
        roster: RosterArgs,
    },
    /// Show one employee with its skills
    Show { id: EmployeeId },
    /// Create an employee
    Create {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        street: Option<String>,
        #[arg(long)]
        postcode: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Skill id to assign (repeatable)
        #[arg(long = "skill")]
        skills: Vec<SkillId>,
    },
    /// Delete an employee
    Delete { id: EmployeeId },
    /// Print the employee list whenever it changes
    Watch {
        #[command(flatten)]
        roster: RosterArgs,
        /// Seconds between reloads
        #[arg(long, default_value = "10")]
        interval: u64,
    },
}

#[derive(Subcommand)]
enum SkillAction {
    /// List skills with the number of employees holding each
    List,
    /// Create a skill
    Create { name: String },
    /// Rename a skill
    Rename { id: SkillId, name: String },
    /// Delete a skill
    Delete {
        id: SkillId,
        /// Detach the skill from every employee holding it first
        #[arg(long)]
        cascade: bool,
    },
    /// Assign a skill to an employee by name
    Assign {
        employee_id: EmployeeId,
        name: String,
        /// Create the skill if it does not exist yet
        #[arg(long)]
        create: bool,
    },
    /// Remove a skill from an employee
    Unassign {
        employee_id: EmployeeId,
        skill_id: SkillId,
    },
    /// Skills assignable to an employee matching a search text
    Search {
        employee_id: EmployeeId,
        #[arg(default_value = "")]
        text: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("staffsync=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Employees { action } => {
            let data = connect()?;
            cmd_employees(&data, action, cli.format, cli.quiet).await
        }

        Commands::Skills { action } => {
            let data = connect()?;
            cmd_skills(&data, action, cli.format, cli.quiet).await
        }

        Commands::Config { action } => cmd_config(action, cli.quiet),

        Commands::Doctor => cmd_doctor(cli.quiet).await,
    };

    if let Err(e) = &result {
        if let Some(core) = e.downcast_ref::<staffsync_core::Error>() {
            report_error(core, cli.format);
            std::process::exit(1);
        }
    }
    result
}

fn connect() -> anyhow::Result<DataLayer> {
    let config = Config::load()?;
    Ok(DataLayer::from_config(&config)?)
}

fn report_error(error: &staffsync_core::Error, format: OutputFormat) {
    let notice = Notice::from_error(error);
    match format {
        OutputFormat::Json => eprintln!(
            "{}",
            json!({
                "notice": notice,
                "code": error.code(),
                "error": error.to_string(),
                "suggestion": error.suggestion(),
            })
        ),
        OutputFormat::Text => {
            eprintln!("{}", notice);
            eprintln!("  [{}] {}", error.code(), error);
            if let Some(suggestion) = error.suggestion() {
                eprintln!("  Try: {}", suggestion);
            }
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn announce(notice: Notice, format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&notice),
        OutputFormat::Text => {
            if !quiet {
                println!("{}", notice);
            }
            Ok(())
        }
    }
}

/// Turn a failed list fetch into an error instead of an empty listing
fn require_loaded(what: &str, outcome: FetchOutcome) -> anyhow::Result<()> {
    match outcome {
        FetchOutcome::Failed(message) => Err(anyhow::anyhow!("Failed to load {}: {}", what, message)),
        _ => Ok(()),
    }
}

async fn load(data: &DataLayer) -> anyhow::Result<()> {
    let (employees, skills) = data.load_all().await;
    require_loaded("employees", employees)?;
    require_loaded("skills", skills)
}

fn skill_labels(employee: &Employee) -> String {
    employee
        .skills()
        .iter()
        .map(|s| s.skill.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_roster(employees: &[Employee], format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(employees);
    }

    if employees.is_empty() {
        if !quiet {
            println!("No employees found.");
        }
        return Ok(());
    }

    if !quiet {
        println!("Employees:");
    }
    for e in employees {
        let id = e.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
        let city = e.city.as_deref().unwrap_or("");
        println!("  {:>4} - {} ({}) [{}]", id, e.display_name(), city, skill_labels(e));
    }
    Ok(())
}

async fn cmd_employees(
    data: &DataLayer,
    action: EmployeeAction,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    match action {
        EmployeeAction::List { roster } => {
            load(data).await?;
            data.selection().replace(roster.skills.iter().copied());
            print_roster(&data.view().roster(&roster.query()), format, quiet)?;
        }
        EmployeeAction::Show { id } => {
            let employee = data.employees().get_one(id).await?;
            if format == OutputFormat::Json {
                return print_json(&employee);
            }
            println!("Employee: {}", employee.display_name());
            println!("  ID: {}", id);
            if let Some(street) = &employee.street {
                println!("  Street: {}", street);
            }
            if employee.postcode.is_some() || employee.city.is_some() {
                println!(
                    "  City: {} {}",
                    employee.postcode.as_deref().unwrap_or(""),
                    employee.city.as_deref().unwrap_or("")
                );
            }
            if let Some(phone) = &employee.phone {
                println!("  Phone: {}", phone);
            }
            let skills = data.skills().employee_skills(id).await?;
            if skills.is_empty() {
                println!("  Skills: none");
            } else {
                println!("  Skills:");
                for skill in skills {
                    println!("    {} - {}", skill.id.unwrap_or_default(), skill.skill);
                }
            }
        }
        EmployeeAction::Create {
            first_name,
            last_name,
            street,
            postcode,
            city,
            phone,
            skills,
        } => {
            let draft = Employee {
                street,
                postcode,
                city,
                phone,
                ..Employee::new(first_name, last_name)
            }
            .with_skills(skills.into_iter().map(SkillRef::Id));
            let created = data.employees().create(&draft).await?;
            let id = created.id.map(|id| id.to_string()).unwrap_or_default();
            announce(
                Notice::success(format!("Employee {} created ({})", id, created.display_name())),
                format,
                quiet,
            )?;
        }
        EmployeeAction::Delete { id } => {
            data.employees().delete(Some(id)).await?;
            announce(Notice::success(format!("Employee {} deleted", id)), format, quiet)?;
        }
        EmployeeAction::Watch { roster, interval } => {
            data.selection().replace(roster.skills.iter().copied());
            cmd_watch(data, roster.query(), interval, format, quiet).await?;
        }
    }
    Ok(())
}

async fn cmd_watch(
    data: &DataLayer,
    query: RosterQuery,
    interval: u64,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let mut roster = data.view().observe_roster(query);
    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));
    let mut last: Option<Vec<Employee>> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let (employees, skills) = data.load_all().await;
                if employees.is_failed() || skills.is_failed() {
                    warn!("Reload failed, showing an empty list until the service answers");
                }
            }
            Some(list) = roster.next() => {
                if last.as_ref() != Some(&list) {
                    print_roster(&list, format, quiet)?;
                    last = Some(list);
                } else {
                    debug!("Roster unchanged");
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

async fn cmd_skills(
    data: &DataLayer,
    action: SkillAction,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    match action {
        SkillAction::List => {
            load(data).await?;
            let usage = data.view().usage();
            if format == OutputFormat::Json {
                return print_json(&usage);
            }
            if usage.is_empty() {
                if !quiet {
                    println!("No skills found.");
                    println!("\nCreate one with: staffsync skills create <name>");
                }
                return Ok(());
            }
            if !quiet {
                println!("Skills:");
            }
            for u in usage {
                println!(
                    "  {:>4} - {} ({} employee(s))",
                    u.skill.id.unwrap_or_default(),
                    u.skill.skill,
                    u.usage_count
                );
            }
        }
        SkillAction::Create { name } => {
            let created = data.skills().create(&name).await?;
            announce(
                Notice::success(format!(
                    "Skill '{}' created with id {}",
                    created.skill,
                    created.id.unwrap_or_default()
                )),
                format,
                quiet,
            )?;
        }
        SkillAction::Rename { id, name } => {
            let renamed = data.skills().update(&Skill::new(id, name.trim())).await?;
            announce(
                Notice::success(format!("Skill {} renamed to '{}'", id, renamed.skill)),
                format,
                quiet,
            )?;
        }
        SkillAction::Delete { id, cascade } => {
            load(data).await?;
            let usage = data
                .view()
                .usage()
                .into_iter()
                .find(|u| u.skill.id == Some(id))
                .ok_or_else(|| staffsync_core::Error::skill_not_found(id))?;

            if !usage.requires_confirmation() {
                data.skills().delete(Some(id)).await?;
                return announce(Notice::success(format!("Skill {} deleted", id)), format, quiet);
            }

            if !cascade {
                if !quiet {
                    println!(
                        "Warning: skill '{}' is assigned to {} employee(s).",
                        usage.skill.skill, usage.usage_count
                    );
                    println!("Use --cascade to remove it from them and delete it.");
                }
                return Ok(());
            }

            let report = data.cascade().delete_skill(id).await?;
            if format == OutputFormat::Json {
                return print_json(&report);
            }
            announce(
                Notice::success(format!(
                    "Skill {} deleted after detaching it from {} employee(s)",
                    id,
                    report.detached.len()
                )),
                format,
                quiet,
            )?;
        }
        SkillAction::Assign {
            employee_id,
            name,
            create,
        } => {
            if create {
                let created = data.skills().create_and_assign(employee_id, &name).await?;
                announce(
                    Notice::success(format!(
                        "Skill '{}' created and assigned to employee {}",
                        created.skill, employee_id
                    )),
                    format,
                    quiet,
                )?;
            } else {
                let name = name.trim();
                data.skills().assign(employee_id, name).await?;
                announce(
                    Notice::success(format!("Skill '{}' assigned to employee {}", name, employee_id)),
                    format,
                    quiet,
                )?;
            }
        }
        SkillAction::Unassign {
            employee_id,
            skill_id,
        } => {
            data.skills().unassign(employee_id, skill_id).await?;
            announce(
                Notice::success(format!("Skill {} removed from employee {}", skill_id, employee_id)),
                format,
                quiet,
            )?;
        }
        SkillAction::Search { employee_id, text } => {
            let (employee, outcome) =
                tokio::join!(data.employees().get_one(employee_id), data.skills().fetch_all());
            require_loaded("skills", outcome)?;
            let search = data.view().search(&employee?, &text);
            if format == OutputFormat::Json {
                return print_json(&search);
            }
            for skill in &search.matches {
                println!("  {:>4} - {}", skill.id.unwrap_or_default(), skill.skill);
            }
            if search.can_create && !quiet {
                println!(
                    "No skill named '{}'. Create and assign it with: staffsync skills assign {} \"{}\" --create",
                    text.trim(),
                    employee_id,
                    text.trim()
                );
            }
        }
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("Staffsync Health Check");
        println!("======================");
        println!();
    }

    let mut all_ok = true;

    // Check configuration
    let config = match Config::load() {
        Ok(config) => {
            if !quiet {
                println!("[OK] Configuration: Valid");
            }
            Some(config)
        }
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Configuration: Error - {}", e);
            }
            None
        }
    };

    // Check token
    if let Some(config) = &config {
        match config.remote.redacted_token() {
            Ok(Some(redacted)) => {
                if !quiet {
                    println!("[OK] Token: Configured ({})", redacted);
                }
            }
            Ok(None) => {
                if !quiet {
                    println!("[--] Token: Not configured (requests are sent without credentials)");
                    println!("     Set the {} environment variable", TOKEN_ENV);
                }
            }
            Err(e) => {
                all_ok = false;
                if !quiet {
                    println!("[!!] Token: Error - {}", e);
                }
            }
        }
    }

    // Check config file location
    if !quiet {
        match Config::config_path() {
            Ok(path) => {
                if path.exists() {
                    println!("[OK] Config file: {}", path.display());
                } else {
                    println!("[--] Config file: {} (using defaults)", path.display());
                }
            }
            Err(e) => println!("[!!] Config file: Error - {}", e),
        }
    }

    // Check the employee service
    if let Some(config) = &config {
        match DataLayer::from_config(config) {
            Ok(data) => {
                let (employees, skills) = data.load_all().await;
                match (&employees, &skills) {
                    (FetchOutcome::Loaded(e), FetchOutcome::Loaded(s)) => {
                        if !quiet {
                            println!(
                                "[OK] Service: {} ({} employees, {} skills)",
                                config.remote.base_url, e, s
                            );
                        }
                    }
                    _ => {
                        all_ok = false;
                        if !quiet {
                            println!("[!!] Service: {} unreachable", config.remote.base_url);
                            for outcome in [&employees, &skills] {
                                if let FetchOutcome::Failed(message) = outcome {
                                    println!("     {}", message);
                                }
                            }
                        }
                    }
                }
            }
            Err(e) => {
                all_ok = false;
                if !quiet {
                    println!("[!!] Service: Error - {}", e);
                }
            }
        }
    }

    if !quiet {
        println!();
        if all_ok {
            println!("All checks passed.");
        } else {
            println!("Some checks need attention.");
        }
    }
    Ok(())
}
