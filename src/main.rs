use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ecert_engine::application::certification::CertificationEngine;
use ecert_engine::application::msfaa::MsfaaManager;
use ecert_engine::application::response::ResponseProcessor;
use ecert_engine::application::summary::RunSummary;
use ecert_engine::domain::ports::{
    MsfaaStoreBox, OverawardStoreBox, RestrictionStoreBox, ScheduleStoreBox, StudentStoreBox,
    TransferChannelBox,
};
use ecert_engine::infrastructure::in_memory::{
    InMemoryMsfaaStore, InMemoryOverawardStore, InMemoryRestrictionStore, InMemoryScheduleStore,
    InMemoryStudentStore, StudentFacts,
};
use ecert_engine::infrastructure::local_transfer::LocalDirTransfer;
use ecert_engine::interfaces::csv::reference_reader::{
    read_msfaas, read_overawards, read_students,
};
use ecert_engine::interfaces::csv::schedule_reader::ScheduleReader;
use ecert_engine::interfaces::csv::schedule_writer::ScheduleWriter;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Run a certification batch: validate, calculate, and deliver an e-Cert
    /// file for every due Pending disbursement.
    Certify {
        /// Disbursement schedule fixture (CSV, one row per award line).
        #[arg(long)]
        schedules: PathBuf,
        /// Student reference fixture (CSV).
        #[arg(long)]
        students: PathBuf,
        /// Overaward ledger fixture (CSV).
        #[arg(long)]
        overawards: Option<PathBuf>,
        /// MSFAA record fixture (CSV).
        #[arg(long)]
        msfaas: Option<PathBuf>,
        /// Directory standing in for the outbound transfer location.
        #[arg(long)]
        outbox: PathBuf,
        /// Environment code stamped into file names and headers.
        #[arg(long, default_value = "PBC")]
        environment: String,
        /// Batch date, YYYY-MM-DD.
        #[arg(long)]
        as_of: NaiveDate,
        /// Sequence number for today's output file.
        #[arg(long, default_value_t = 1)]
        file_sequence: u32,
    },
    /// Decode inbound feedback files and complete/cancel matching schedules.
    ImportResponses {
        /// Disbursement schedule fixture (CSV, one row per award line).
        #[arg(long)]
        schedules: PathBuf,
        /// Directory the funding authority drops feedback files into.
        #[arg(long)]
        inbox: PathBuf,
        #[arg(long, default_value = "PBC")]
        environment: String,
        #[arg(long)]
        as_of: NaiveDate,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .with_target(verbose >= 2)
        .init();
}

async fn load_schedules(path: &PathBuf) -> Result<InMemoryScheduleStore> {
    let file = File::open(path).into_diagnostic()?;
    let schedules = ScheduleReader::new(file).schedules().into_diagnostic()?;
    let store = InMemoryScheduleStore::new();
    store.seed(schedules).await;
    Ok(store)
}

fn report(summary: &RunSummary) -> Result<()> {
    eprintln!(
        "{}",
        serde_json::to_string_pretty(summary).into_diagnostic()?
    );
    Ok(())
}

async fn write_results(store: &InMemoryScheduleStore) -> Result<()> {
    use ecert_engine::domain::ports::ScheduleStore;

    let all = store.all().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = ScheduleWriter::new(stdout.lock());
    writer.write_schedules(&all).into_diagnostic()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Certify {
            schedules,
            students,
            overawards,
            msfaas,
            outbox,
            environment,
            as_of,
            file_sequence,
        } => {
            let schedule_store = load_schedules(&schedules).await?;

            let student_rows =
                read_students(File::open(students).into_diagnostic()?).into_diagnostic()?;
            let student_store = InMemoryStudentStore::new();
            let restriction_store = InMemoryRestrictionStore::new();
            for row in &student_rows {
                if row.stop_disbursement_restriction {
                    restriction_store.restrict(row.student_id).await;
                }
            }
            student_store
                .seed(
                    student_rows
                        .iter()
                        .map(|row| StudentFacts {
                            profile: row.profile(),
                            disability_verified: row.disability_verified,
                            part_time_loan_limit_reached: row.part_time_loan_limit_reached,
                        })
                        .collect(),
                )
                .await;

            let overaward_store = InMemoryOverawardStore::new();
            if let Some(path) = overawards {
                let entries =
                    read_overawards(File::open(path).into_diagnostic()?).into_diagnostic()?;
                overaward_store.seed(entries).await;
            }

            let msfaa_store = InMemoryMsfaaStore::new();
            if let Some(path) = msfaas {
                let records =
                    read_msfaas(File::open(path).into_diagnostic()?).into_diagnostic()?;
                msfaa_store.seed(records).await;
            }

            let engine = CertificationEngine::new(
                Box::new(schedule_store.clone()) as ScheduleStoreBox,
                Box::new(overaward_store.clone()) as OverawardStoreBox,
                MsfaaManager::new(Box::new(msfaa_store) as MsfaaStoreBox),
                Box::new(restriction_store) as RestrictionStoreBox,
                Box::new(student_store) as StudentStoreBox,
                Box::new(LocalDirTransfer::new(outbox)) as TransferChannelBox,
            );

            let summary = engine
                .execute(as_of, &environment, file_sequence)
                .await
                .into_diagnostic()?;
            report(&summary)?;
            write_results(&schedule_store).await?;
        }
        Command::ImportResponses {
            schedules,
            inbox,
            environment,
            as_of,
        } => {
            let schedule_store = load_schedules(&schedules).await?;

            let processor = ResponseProcessor::new(
                Box::new(schedule_store.clone()) as ScheduleStoreBox,
                Box::new(LocalDirTransfer::new(inbox)) as TransferChannelBox,
            );

            let summary = processor
                .process(&environment, as_of)
                .await
                .into_diagnostic()?;
            report(&summary)?;
            write_results(&schedule_store).await?;
        }
    }

    Ok(())
}
