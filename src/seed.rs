//! Built-in dataset used whenever a storage slot is missing or unreadable.
//!
//! Ids are fixed constants rather than fresh v4 uuids: slots fall back to
//! seed data independently of each other, and cross-collection references
//! (task -> user, task -> project) must survive a partial reseed.

use jiff::civil::Date;
use jiff::{SignedDuration, Span, Timestamp, Zoned};
use uuid::Uuid;

use crate::models::{
    project::Project,
    task::{Status, Task},
    template::{TaskTemplate, TemplateTask},
    user::{Role, User},
};

pub const SEED_USER_ADMIN: Uuid = Uuid::from_u128(0x5eed_0001);
pub const SEED_USER_BRUNO: Uuid = Uuid::from_u128(0x5eed_0002);
pub const SEED_USER_CARLA: Uuid = Uuid::from_u128(0x5eed_0003);

pub const SEED_PROJECT_WEBSITE: Uuid = Uuid::from_u128(0x5eed_1001);
pub const SEED_PROJECT_MARKETING: Uuid = Uuid::from_u128(0x5eed_1002);
pub const SEED_PROJECT_INTERNAL: Uuid = Uuid::from_u128(0x5eed_1003);

const SEED_TASK_IDS: [Uuid; 7] = [
    Uuid::from_u128(0x5eed_2001),
    Uuid::from_u128(0x5eed_2002),
    Uuid::from_u128(0x5eed_2003),
    Uuid::from_u128(0x5eed_2004),
    Uuid::from_u128(0x5eed_2005),
    Uuid::from_u128(0x5eed_2006),
    Uuid::from_u128(0x5eed_2007),
];

pub const SEED_TEMPLATE_ONBOARDING: Uuid = Uuid::from_u128(0x5eed_3001);

pub fn users() -> Vec<User> {
    vec![
        User {
            id: SEED_USER_ADMIN,
            name: String::from("Paulo Guanais (Admin)"),
            email: String::from("paulo@guanais.com.br"),
            phone: String::from("11999998888"),
            role: Role::Admin,
            password: Some(String::from("PauloP27")),
        },
        User {
            id: SEED_USER_BRUNO,
            name: String::from("Bruno Costa"),
            email: String::from("bruno.costa@example.com"),
            phone: String::from("11988887777"),
            role: Role::Collaborator,
            password: Some(String::from("user")),
        },
        User {
            id: SEED_USER_CARLA,
            name: String::from("Carla Dias"),
            email: String::from("carla.dias@example.com"),
            phone: String::from("11977776666"),
            role: Role::Collaborator,
            password: Some(String::from("user")),
        },
    ]
}

pub fn projects() -> Vec<Project> {
    vec![
        Project {
            id: SEED_PROJECT_WEBSITE,
            name: String::from("Lançamento Website"),
            description: String::from(
                "Desenvolvimento e lançamento do novo website corporativo.",
            ),
        },
        Project {
            id: SEED_PROJECT_MARKETING,
            name: String::from("Campanha de Marketing Q3"),
            description: String::from(
                "Planejamento e execução da campanha de marketing para o terceiro trimestre.",
            ),
        },
        Project {
            id: SEED_PROJECT_INTERNAL,
            name: String::from("Reestruturação Interna"),
            description: String::from("Projeto para otimizar processos internos da equipe."),
        },
    ]
}

pub fn tasks() -> Vec<Task> {
    let today = Zoned::now().date();
    let yesterday = today.yesterday().expect("yesterday should be valid");
    let tomorrow = today.tomorrow().expect("tomorrow should be valid");
    let next_week = add_days(today, 7);
    let two_days_ago = add_days(today, -2);

    let seed_task = |index: usize,
                     title: &str,
                     description: &str,
                     due_date: Date,
                     assignee_id: Uuid,
                     project_id: Uuid,
                     created_days_ago: i64|
     -> Task {
        Task {
            id: SEED_TASK_IDS[index],
            title: title.to_string(),
            description: description.to_string(),
            due_date,
            assignee_id: Some(assignee_id),
            project_id,
            status: Status::Todo,
            completed_at: None,
            created_at: days_ago(created_days_ago),
        }
    };

    let mut tasks = vec![
        seed_task(
            0,
            "Definir wireframes da home",
            "Criar os wireframes para a página inicial do novo site.",
            today,
            SEED_USER_BRUNO,
            SEED_PROJECT_WEBSITE,
            2,
        ),
        seed_task(
            1,
            "Configurar ambiente de dev",
            "Preparar o ambiente de desenvolvimento para o projeto.",
            yesterday,
            SEED_USER_CARLA,
            SEED_PROJECT_WEBSITE,
            2,
        ),
        seed_task(
            2,
            "Pesquisa de palavras-chave",
            "Realizar pesquisa de palavras-chave para a campanha de SEO.",
            tomorrow,
            SEED_USER_BRUNO,
            SEED_PROJECT_MARKETING,
            1,
        ),
        seed_task(
            3,
            "Criar posts para redes sociais",
            "Elaborar 5 posts para o Instagram e Facebook.",
            next_week,
            SEED_USER_CARLA,
            SEED_PROJECT_MARKETING,
            1,
        ),
        seed_task(
            4,
            "Revisar documentação de onboarding",
            "Revisar e atualizar a documentação para novos colaboradores.",
            today,
            SEED_USER_ADMIN,
            SEED_PROJECT_INTERNAL,
            2,
        ),
        seed_task(
            5,
            "Agendar reunião de kickoff",
            "Marcar a reunião inicial com todos os stakeholders.",
            two_days_ago,
            SEED_USER_ADMIN,
            SEED_PROJECT_WEBSITE,
            5,
        ),
        seed_task(
            6,
            "Análise de concorrentes",
            "Analisar as estratégias de marketing dos principais concorrentes.",
            next_week,
            SEED_USER_BRUNO,
            SEED_PROJECT_MARKETING,
            0,
        ),
    ];

    // The kickoff task ships already completed so the report view has data.
    tasks[5].status = Status::Done;
    tasks[5].completed_at = Some(days_ago(1));

    tasks
}

pub fn templates() -> Vec<TaskTemplate> {
    vec![TaskTemplate {
        id: SEED_TEMPLATE_ONBOARDING,
        name: String::from("Onboarding de Novo Cliente"),
        tasks: vec![
            TemplateTask {
                title: String::from("Reunião de Kickoff"),
                description: String::from("Agendar e conduzir a reunião inicial."),
                due_offset_days: 2,
            },
            TemplateTask {
                title: String::from("Configuração da Conta"),
                description: String::from("Criar e configurar a conta do cliente no sistema."),
                due_offset_days: 3,
            },
            TemplateTask {
                title: String::from("Treinamento Inicial"),
                description: String::from(
                    "Realizar o treinamento da plataforma para o cliente.",
                ),
                due_offset_days: 7,
            },
        ],
    }]
}

fn add_days(date: Date, days: i64) -> Date {
    date.checked_add(Span::new().days(days))
        .expect("seed date should be in range")
}

fn days_ago(days: i64) -> Timestamp {
    Timestamp::now()
        .checked_sub(SignedDuration::from_hours(days * 24))
        .expect("seed timestamp should be in range")
}
