//! Operator CLI for a local quizdesk store.
//!
//! # Responsibility
//! - Translate command-line arguments into core service calls.
//! - Print results as pretty JSON on stdout; errors go to stderr with exit 1.

use clap::{Parser, Subcommand};
use std::process;

mod commands;
mod config;

use commands::{Principal, Scope};
use config::GlobalOpts;
use quizdesk_core::QuestionDraft;

#[derive(Parser)]
#[command(name = "quizdesk", version, about = "Teacher/student assessment store")]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the store, seeding it on first start, and print its path
    Init,

    /// Print entity counts
    Status,

    /// Print the school hierarchy
    Schools,

    /// Author a test with questions and assigned students
    CreateTest {
        #[arg(long)]
        teacher: String,

        #[arg(long)]
        title: String,

        /// Question as "<points>:<prompt>", repeat in order
        #[arg(long = "question", required = true, value_parser = commands::parse_question_draft)]
        questions: Vec<QuestionDraft>,

        /// Assigned student id, repeatable
        #[arg(long = "student")]
        students: Vec<String>,
    },

    /// List tests owned by a teacher or assigned to a student
    Tests {
        #[command(flatten)]
        principal: Principal,
    },

    /// List a test's questions in order
    Questions {
        #[command(flatten)]
        scope: Scope,
    },

    /// Submit or resubmit a student's answer
    Submit {
        #[arg(long)]
        student: String,

        #[arg(long)]
        test: String,

        #[arg(long)]
        question: String,

        #[arg(long)]
        response: String,
    },

    /// Grade or re-grade one answer
    Grade {
        #[arg(long)]
        teacher: String,

        #[arg(long)]
        test: String,

        #[arg(long)]
        question: String,

        #[arg(long)]
        student: String,

        #[arg(long, allow_hyphen_values = true)]
        score: i32,

        #[arg(long, default_value = "")]
        feedback: String,

        #[arg(long)]
        completed: bool,
    },

    /// List answers on a test (all for its teacher, own for a student)
    Answers {
        #[command(flatten)]
        scope: Scope,
    },

    /// List results on a test (all for its teacher, own for a student)
    Results {
        #[command(flatten)]
        scope: Scope,
    },

    /// Print the core library version
    Version,
}

fn main() {
    let cli = Cli::parse();

    let result = cli.global.init_logging().and_then(|()| match cli.command {
        Commands::Init => commands::store::init(&cli.global),
        Commands::Status => commands::store::status(&cli.global),
        Commands::Schools => commands::store::schools(&cli.global),
        Commands::CreateTest {
            teacher,
            title,
            questions,
            students,
        } => commands::authoring::create_test(&cli.global, teacher, title, questions, students),
        Commands::Tests { principal } => commands::listing::tests(&cli.global, principal),
        Commands::Questions { scope } => commands::listing::questions(&cli.global, scope),
        Commands::Submit {
            student,
            test,
            question,
            response,
        } => commands::authoring::submit(&cli.global, student, test, question, response),
        Commands::Grade {
            teacher,
            test,
            question,
            student,
            score,
            feedback,
            completed,
        } => commands::authoring::grade(
            &cli.global,
            commands::authoring::GradeArgs {
                teacher,
                test,
                question,
                student,
                score,
                feedback,
                completed,
            },
        ),
        Commands::Answers { scope } => commands::listing::answers(&cli.global, scope),
        Commands::Results { scope } => commands::listing::results(&cli.global, scope),
        Commands::Version => {
            println!("quizdesk_core {}", quizdesk_core::core_version());
            Ok(())
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
