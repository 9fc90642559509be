use clap::{Parser, Subcommand};
use colored::*;

use crate::{
    models::{
        store::Store,
        template::TemplateTask,
        user::{Role, User},
    },
    services::{
        projects::{
            CreateProjectParameters, DeleteProjectError, DeleteProjectParameters, ProjectLookupError,
            create_project, delete_project, find_project,
        },
        session::{LoginError, current_user, login, logout},
        tasks::{
            AddTaskError, AddTaskParameters, DeleteTaskError, DeleteTaskParameters,
            ToggleTaskError, ToggleTaskParameters, add_task, delete_task, toggle_task,
        },
        templates::{
            CreateTemplateParameters, DeleteTemplateError, DeleteTemplateParameters,
            SaveTemplateError, UpdateTemplateParameters, create_template, delete_template,
            update_template,
        },
        users::{
            CreateUserParameters, DeleteUserError, DeleteUserParameters, UpdateUserError,
            UpdateUserParameters, create_user, delete_user, update_user,
        },
    },
    storage::{
        Storage,
        json::{JsonDirStorage, default_data_dir, log_dir},
    },
};

mod logging;
mod models;
mod seed;
mod services;
mod storage;
mod ui;
mod views;

#[derive(Parser)]
#[command(
    name = "guantask",
    about = "A small-team task manager for your terminal"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with email and password
    Login { email: String, password: String },

    /// Log out and clear the saved session
    Logout,

    /// Show who is currently logged in
    Whoami,

    /// Show my tasks: overdue, due today, upcoming
    Home,

    /// Report of completed tasks
    Reports,

    /// Show or switch the color theme (no argument toggles it)
    Theme {
        /// 'light' or 'dark'
        theme: Option<String>,
    },

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Manage collaborators
    #[command(subcommand)]
    User(UserCommands),

    /// Manage task templates
    #[command(subcommand)]
    Template(TemplateCommands),
}

#[derive(Debug, Subcommand)]
enum TaskCommands {
    /// Add a new task
    Add {
        /// Task title
        title: String,

        /// Task description
        #[arg(long, default_value = "")]
        description: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: String,

        /// Project the task belongs to (name substring)
        #[arg(short, long)]
        project: String,

        /// Assign to a user (name or email substring)
        #[arg(short, long)]
        assignee: Option<String>,
    },

    /// Flip a task between to-do and done
    Toggle {
        /// Task id or title substring
        task: String,
    },

    /// Delete a task
    Delete {
        /// Task id or title substring
        task: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ProjectCommands {
    /// List all projects
    List,

    /// Create a new project
    New {
        name: String,

        /// Project description
        #[arg(long, default_value = "")]
        description: String,
    },

    /// View the tasks of a project
    View {
        /// Project name substring
        name: String,
    },

    /// Delete a project and all of its tasks
    Delete {
        /// Project name substring
        name: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum UserCommands {
    /// List all collaborators
    List,

    /// Add a collaborator
    Add {
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "")]
        phone: String,

        /// 'admin' or 'collaborator'
        #[arg(long)]
        role: Option<String>,

        /// Initial password
        #[arg(long)]
        password: Option<String>,
    },

    /// Edit a collaborator
    Edit {
        /// Name or email substring
        user: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// 'admin' or 'collaborator'
        #[arg(long)]
        role: Option<String>,

        #[arg(long)]
        password: Option<String>,
    },

    /// Delete a collaborator; their tasks become unassigned
    Delete {
        /// Name or email substring
        user: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum TemplateCommands {
    /// List all templates
    List,

    /// Create a template from task blueprints
    New {
        name: String,

        /// Blueprint as 'title|description|offset_days' (repeatable)
        #[arg(short, long = "task", action = clap::ArgAction::Append)]
        tasks: Vec<String>,
    },

    /// Edit a template
    Edit {
        /// Template name substring
        template: String,

        /// New template name
        #[arg(long)]
        name: Option<String>,

        /// Replacement blueprint as 'title|description|offset_days' (repeatable)
        #[arg(short, long = "task", action = clap::ArgAction::Append)]
        tasks: Vec<String>,
    },

    /// Delete a template
    Delete {
        /// Template name substring
        name: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let data_dir = default_data_dir();
    std::fs::create_dir_all(&data_dir).unwrap_or_else(|e| {
        eprintln!("Error: Failed to create data directory: {}", e);
        std::process::exit(1);
    });

    // Logging is best-effort; a failed bootstrap must not block the user.
    let _logger = match logging::init_logging(&log_dir(&data_dir)) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        }
    };

    let storage = JsonDirStorage::new(data_dir);
    let mut store = storage.load();
    let today = jiff::Zoned::now().date();

    match cli.command {
        Commands::Login { email, password } => {
            match login(&store, &storage, &email, &password) {
                Ok(user) => {
                    println!("✓ Logged in as {} ({})", user.name, user.role.as_str());
                }
                Err(LoginError::InvalidCredentials) => {
                    eprintln!("Error: Invalid email or password");
                    eprintln!("\nTry \"paulo@guanais.com.br\" / \"PauloP27\"");
                    eprintln!("or  \"bruno.costa@example.com\" / \"user\"");
                    std::process::exit(1);
                }
                Err(LoginError::Storage(e)) => {
                    eprintln!("Error: Failed to save session: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Logout => match logout(&storage) {
            Ok(()) => println!("✓ Logged out"),
            Err(e) => {
                eprintln!("Error: Failed to clear session: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Whoami => match current_user(&store, &storage) {
            Some(user) => {
                println!("{} <{}>", user.name.bold(), user.email);
                println!("{}", user.role.as_str().dimmed());
            }
            None => println!("Not logged in"),
        },
        Commands::Home => {
            let user = require_login(&store, &storage);

            let overdue = views::overdue(&store, &user, today);
            let due_today = views::due_today(&store, &user, today);
            let upcoming = views::upcoming(&store, &user, today);
            let total = overdue.len() + due_today.len() + upcoming.len();

            if total == 0 {
                println!("No open tasks assigned to you");
            } else {
                ui::render_view_header("My Tasks", total);

                if !overdue.is_empty() {
                    ui::render_section_header("Overdue");
                    for task in overdue {
                        ui::render_task_line(task, &store, today, true);
                    }
                }

                if !due_today.is_empty() {
                    ui::render_section_header("Due Today");
                    for task in due_today {
                        ui::render_task_line(task, &store, today, false);
                    }
                }

                if !upcoming.is_empty() {
                    ui::render_section_header("Upcoming");
                    for task in upcoming {
                        ui::render_task_line(task, &store, today, false);
                    }
                }
            }
        }
        Commands::Reports => {
            require_login(&store, &storage);

            let report = views::completed_report(&store);
            if report.is_empty() {
                println!("No completed tasks yet");
            } else {
                ui::render_view_header("Completed Tasks", report.len());
                for entry in &report {
                    ui::render_report_entry(entry, today);
                }
            }
        }
        Commands::Theme { theme } => {
            let next = match theme {
                Some(value) => match value.parse() {
                    Ok(t) => t,
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                },
                None => storage.load_theme().toggled(),
            };

            if let Err(e) = storage.save_theme(next) {
                eprintln!("Error: Failed to save theme: {}", e);
                std::process::exit(1);
            }
            println!("✓ Theme set to {}", next);
        }
        Commands::Task(TaskCommands::Add {
            title,
            description,
            due,
            project,
            assignee,
        }) => {
            require_login(&store, &storage);

            let params = AddTaskParameters {
                title,
                description,
                due_date: due,
                assignee,
                project,
            };

            match add_task(&mut store, &storage, params) {
                Ok(task) => {
                    println!("✓ Task added: {}", task.title);
                    if let Some(project) = store.get_project(task.project_id) {
                        println!("  Project: {}", project.name);
                    }
                    println!("  Due: {}", ui::format_date(task.due_date, today));
                }
                Err(AddTaskError::ProjectNotFound(name)) => {
                    eprintln!("Error: Project '{}' not found", name);

                    if store.projects.is_empty() {
                        eprintln!("\nNo projects exist yet. Create one first.");
                    } else {
                        eprintln!("\nAvailable projects:");
                        for project in &store.projects {
                            eprintln!("  - {}", project.name);
                        }
                    }
                    std::process::exit(1);
                }
                Err(AddTaskError::AmbiguousProjectName(names)) => {
                    eprintln!("Error: Project name is ambiguous. Multiple projects found:");
                    for name in names {
                        eprintln!("  - {}", name);
                    }
                    eprintln!("\nPlease be more specific.");
                    std::process::exit(1);
                }
                Err(AddTaskError::AssigneeNotFound(name)) => {
                    eprintln!("Error: User '{}' not found", name);
                    std::process::exit(1);
                }
                Err(AddTaskError::AmbiguousAssigneeName(names)) => {
                    eprintln!("Error: User name is ambiguous. Multiple users found:");
                    for name in names {
                        eprintln!("  - {}", name);
                    }
                    eprintln!("\nPlease be more specific.");
                    std::process::exit(1);
                }
                Err(AddTaskError::InvalidDueDate(date_str, error)) => {
                    eprintln!("Error: Invalid due date '{}': {}", date_str, error);
                    eprintln!("\nExpected format: YYYY-MM-DD (e.g., 2025-03-01)");
                    std::process::exit(1);
                }
                Err(AddTaskError::Storage(e)) => {
                    eprintln!("Error: Failed to save task: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Task(TaskCommands::Toggle { task }) => {
            require_login(&store, &storage);

            match toggle_task(&mut store, &storage, ToggleTaskParameters { task }) {
                Ok(task) => match task.status {
                    models::task::Status::Done => println!("✓ Task completed: {}", task.title),
                    models::task::Status::Todo => println!("○ Task reopened: {}", task.title),
                },
                Err(ToggleTaskError::TaskNotFound(selector)) => {
                    eprintln!("Error: Task '{}' not found", selector);
                    std::process::exit(1);
                }
                Err(ToggleTaskError::AmbiguousTaskTitle(titles)) => {
                    eprintln!("Error: Task title is ambiguous. Multiple tasks found:");
                    for title in titles {
                        eprintln!("  - {}", title);
                    }
                    eprintln!("\nPlease be more specific or use the task id.");
                    std::process::exit(1);
                }
                Err(ToggleTaskError::Storage(e)) => {
                    eprintln!("Error: Failed to save task: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Task(TaskCommands::Delete { task, yes }) => {
            require_login(&store, &storage);

            if !yes && !ui::confirm(&format!("Delete task matching '{}'?", task)) {
                println!("Aborted.");
                return;
            }

            match delete_task(&mut store, &storage, DeleteTaskParameters { task }) {
                Ok(task) => println!("✓ Task deleted: {}", task.title),
                Err(DeleteTaskError::TaskNotFound(selector)) => {
                    eprintln!("Error: Task '{}' not found", selector);
                    std::process::exit(1);
                }
                Err(DeleteTaskError::AmbiguousTaskTitle(titles)) => {
                    eprintln!("Error: Task title is ambiguous. Multiple tasks found:");
                    for title in titles {
                        eprintln!("  - {}", title);
                    }
                    eprintln!("\nPlease be more specific or use the task id.");
                    std::process::exit(1);
                }
                Err(DeleteTaskError::Storage(e)) => {
                    eprintln!("Error: Failed to save tasks: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Project(ProjectCommands::List) => {
            require_login(&store, &storage);

            if store.projects.is_empty() {
                println!("No projects yet");
            } else {
                ui::render_view_header("Projects", store.projects.len());
                for project in &store.projects {
                    let open_tasks = store
                        .tasks_for_project(project.id)
                        .filter(|t| t.completed_at.is_none())
                        .count();
                    println!(
                        "  {}  {}",
                        project.name.bold(),
                        format!("({} open tasks)", open_tasks).dimmed()
                    );
                    if !project.description.is_empty() {
                        println!("     {}", project.description.dimmed());
                    }
                }
            }
        }
        Commands::Project(ProjectCommands::New { name, description }) => {
            let user = require_login(&store, &storage);
            require_admin(&user);

            let params = CreateProjectParameters { name, description };
            match create_project(&mut store, &storage, params) {
                Ok(project) => println!("✓ Project created: {}", project.name),
                Err(e) => {
                    eprintln!("Error: Failed to create project: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Project(ProjectCommands::View { name }) => {
            require_login(&store, &storage);

            let project = match find_project(&store, &name) {
                Ok(project) => project,
                Err(ProjectLookupError::ProjectNotFound(name)) => {
                    eprintln!("Error: Project '{}' not found", name);
                    std::process::exit(1);
                }
                Err(ProjectLookupError::AmbiguousProjectName(names)) => {
                    eprintln!("Error: Project name is ambiguous. Multiple projects found:");
                    for name in names {
                        eprintln!("  - {}", name);
                    }
                    eprintln!("\nPlease be more specific.");
                    std::process::exit(1);
                }
            };

            let tasks = views::project_tasks(&store, project.id);
            ui::render_view_header(&project.name, tasks.len());
            if !project.description.is_empty() {
                println!("  {}\n", project.description.dimmed());
            }
            for task in tasks {
                let is_overdue = ui::is_overdue(task, today);
                ui::render_task_line(task, &store, today, is_overdue);
            }
        }
        Commands::Project(ProjectCommands::Delete { name, yes }) => {
            let user = require_login(&store, &storage);
            require_admin(&user);

            if !yes
                && !ui::confirm(&format!(
                    "Delete project matching '{}' and all of its tasks?",
                    name
                ))
            {
                println!("Aborted.");
                return;
            }

            match delete_project(&mut store, &storage, DeleteProjectParameters { name }) {
                Ok(result) => {
                    println!("✓ Project deleted: {}", result.project.name);
                    if result.cascaded_tasks_count > 0 {
                        println!("  └─ {} task(s) also deleted", result.cascaded_tasks_count);
                    }
                }
                Err(DeleteProjectError::ProjectNotFound(name)) => {
                    eprintln!("Error: Project '{}' not found", name);
                    std::process::exit(1);
                }
                Err(DeleteProjectError::AmbiguousProjectName(names)) => {
                    eprintln!("Error: Project name is ambiguous. Multiple projects found:");
                    for name in names {
                        eprintln!("  - {}", name);
                    }
                    eprintln!("\nPlease be more specific.");
                    std::process::exit(1);
                }
                Err(DeleteProjectError::Storage(e)) => {
                    eprintln!("Error: Failed to delete project: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::User(UserCommands::List) => {
            let user = require_login(&store, &storage);
            require_admin(&user);

            ui::render_view_header("Collaborators", store.users.len());
            for user in &store.users {
                println!("  {}  {}", user.name.bold(), user.role.as_str().dimmed());
                println!(
                    "     {}",
                    format!("{} · {}", user.email, user.phone).dimmed()
                );
            }
        }
        Commands::User(UserCommands::Add {
            name,
            email,
            phone,
            role,
            password,
        }) => {
            let current = require_login(&store, &storage);
            require_admin(&current);

            let role = parse_role(role.as_deref()).unwrap_or(Role::Collaborator);

            let params = CreateUserParameters {
                name,
                email,
                phone,
                role,
                password,
            };
            match create_user(&mut store, &storage, params) {
                Ok(user) => println!("✓ Collaborator added: {} ({})", user.name, user.role.as_str()),
                Err(e) => {
                    eprintln!("Error: Failed to add collaborator: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::User(UserCommands::Edit {
            user,
            name,
            email,
            phone,
            role,
            password,
        }) => {
            let current = require_login(&store, &storage);
            require_admin(&current);

            let role = match role {
                Some(value) => Some(parse_role_or_exit(&value)),
                None => None,
            };

            let params = UpdateUserParameters {
                user,
                name,
                email,
                phone,
                role,
                password,
            };
            match update_user(&mut store, &storage, params) {
                Ok(user) => println!("✓ Collaborator updated: {}", user.name),
                Err(UpdateUserError::UserNotFound(selector)) => {
                    eprintln!("Error: User '{}' not found", selector);
                    std::process::exit(1);
                }
                Err(UpdateUserError::AmbiguousUserName(names)) => {
                    eprintln!("Error: User name is ambiguous. Multiple users found:");
                    for name in names {
                        eprintln!("  - {}", name);
                    }
                    eprintln!("\nPlease be more specific.");
                    std::process::exit(1);
                }
                Err(UpdateUserError::Storage(e)) => {
                    eprintln!("Error: Failed to update collaborator: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::User(UserCommands::Delete { user, yes }) => {
            let current = require_login(&store, &storage);
            require_admin(&current);

            if !yes
                && !ui::confirm(&format!(
                    "Delete collaborator matching '{}'? Their tasks become unassigned.",
                    user
                ))
            {
                println!("Aborted.");
                return;
            }

            let params = DeleteUserParameters {
                user,
                current_user_id: current.id,
            };
            match delete_user(&mut store, &storage, params) {
                Ok(result) => {
                    println!("✓ Collaborator deleted: {}", result.user.name);
                    if result.unassigned_tasks_count > 0 {
                        println!(
                            "  └─ {} task(s) are now unassigned",
                            result.unassigned_tasks_count
                        );
                    }
                }
                Err(DeleteUserError::CannotDeleteSelf) => {
                    eprintln!("Error: You cannot delete the account you are logged in with");
                    std::process::exit(1);
                }
                Err(DeleteUserError::UserNotFound(selector)) => {
                    eprintln!("Error: User '{}' not found", selector);
                    std::process::exit(1);
                }
                Err(DeleteUserError::AmbiguousUserName(names)) => {
                    eprintln!("Error: User name is ambiguous. Multiple users found:");
                    for name in names {
                        eprintln!("  - {}", name);
                    }
                    eprintln!("\nPlease be more specific.");
                    std::process::exit(1);
                }
                Err(DeleteUserError::Storage(e)) => {
                    eprintln!("Error: Failed to delete collaborator: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Template(TemplateCommands::List) => {
            let user = require_login(&store, &storage);
            require_admin(&user);

            if store.templates.is_empty() {
                println!("No templates yet");
            } else {
                ui::render_view_header("Task Templates", store.templates.len());
                for template in &store.templates {
                    println!(
                        "  {}  {}",
                        template.name.bold(),
                        format!("({} tasks)", template.tasks.len()).dimmed()
                    );
                    for blueprint in &template.tasks {
                        println!(
                            "     {} {}",
                            "·".dimmed(),
                            format!("{} (+{}d)", blueprint.title, blueprint.due_offset_days)
                                .dimmed()
                        );
                    }
                }
            }
        }
        Commands::Template(TemplateCommands::New { name, tasks }) => {
            let user = require_login(&store, &storage);
            require_admin(&user);

            let blueprints = parse_blueprints_or_exit(&tasks);

            let params = CreateTemplateParameters {
                name,
                tasks: blueprints,
            };
            match create_template(&mut store, &storage, params) {
                Ok(template) => {
                    println!(
                        "✓ Template created: {} ({} tasks)",
                        template.name,
                        template.tasks.len()
                    );
                }
                Err(e @ SaveTemplateError::EmptyName)
                | Err(e @ SaveTemplateError::EmptyBlueprintList) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Error: Failed to save template: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Template(TemplateCommands::Edit {
            template,
            name,
            tasks,
        }) => {
            let user = require_login(&store, &storage);
            require_admin(&user);

            let blueprints = if tasks.is_empty() {
                None
            } else {
                Some(parse_blueprints_or_exit(&tasks))
            };

            let params = UpdateTemplateParameters {
                template,
                name,
                tasks: blueprints,
            };
            match update_template(&mut store, &storage, params) {
                Ok(template) => println!("✓ Template updated: {}", template.name),
                Err(SaveTemplateError::TemplateNotFound(selector)) => {
                    eprintln!("Error: Template '{}' not found", selector);
                    std::process::exit(1);
                }
                Err(SaveTemplateError::AmbiguousTemplateName(names)) => {
                    eprintln!("Error: Template name is ambiguous. Multiple templates found:");
                    for name in names {
                        eprintln!("  - {}", name);
                    }
                    eprintln!("\nPlease be more specific.");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Template(TemplateCommands::Delete { name, yes }) => {
            let user = require_login(&store, &storage);
            require_admin(&user);

            if !yes && !ui::confirm(&format!("Delete template matching '{}'?", name)) {
                println!("Aborted.");
                return;
            }

            match delete_template(&mut store, &storage, DeleteTemplateParameters { name }) {
                Ok(template) => println!("✓ Template deleted: {}", template.name),
                Err(DeleteTemplateError::TemplateNotFound(selector)) => {
                    eprintln!("Error: Template '{}' not found", selector);
                    std::process::exit(1);
                }
                Err(DeleteTemplateError::AmbiguousTemplateName(names)) => {
                    eprintln!("Error: Template name is ambiguous. Multiple templates found:");
                    for name in names {
                        eprintln!("  - {}", name);
                    }
                    eprintln!("\nPlease be more specific.");
                    std::process::exit(1);
                }
                Err(DeleteTemplateError::Storage(e)) => {
                    eprintln!("Error: Failed to delete template: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn require_login(store: &Store, storage: &impl Storage) -> User {
    match current_user(store, storage) {
        Some(user) => user.clone(),
        None => {
            eprintln!("Error: Not logged in");
            eprintln!("\nRun: guantask login <email> <password>");
            std::process::exit(1);
        }
    }
}

fn require_admin(user: &User) {
    if user.role != Role::Admin {
        eprintln!("Error: This action requires the ADMIN role");
        std::process::exit(1);
    }
}

fn parse_role(value: Option<&str>) -> Option<Role> {
    value.map(parse_role_or_exit)
}

fn parse_role_or_exit(value: &str) -> Role {
    value.parse().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    })
}

fn parse_blueprints_or_exit(specs: &[String]) -> Vec<TemplateTask> {
    specs
        .iter()
        .map(|spec| {
            spec.parse::<TemplateTask>().unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                eprintln!("\nExample: --task 'Kickoff meeting|Schedule the kickoff|2'");
                std::process::exit(1);
            })
        })
        .collect()
}
