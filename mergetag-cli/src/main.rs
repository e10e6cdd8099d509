use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::Result;
use mergetag::{
    convert_to_klaviyo, data, extract_placeholders, fill_template, preview, Settings, Value,
    VariableField,
};
use serde_json::Value as JsonValue;

#[derive(Parser, Debug)]
#[clap(name = "mergetag", about, version)]
struct Args {
    /// Increase output logging verbosity.
    #[clap(short, long)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill a template's placeholders from a file of variables.
    Fill {
        /// Template file, optionally with name/subject front matter.
        template: PathBuf,
        /// JSON, YAML or TOML file mapping variable names to values.
        #[clap(long)]
        vars: PathBuf,
    },
    /// Convert a template into Klaviyo merge tags.
    Klaviyo {
        template: PathBuf,
        /// Variables table snapshot (tableData and updatedRows).
        #[clap(long)]
        table: PathBuf,
    },
    /// Print the variables defined by a variables table snapshot.
    Vars {
        #[clap(long)]
        table: PathBuf,
        /// Print descriptions instead of default values.
        #[clap(long)]
        descriptions: bool,
    },
    /// List the placeholders a template uses.
    Placeholders { template: PathBuf },
    /// Render one preview per sample profile.
    Preview {
        template: PathBuf,
        /// Glob pattern of sample profile files.
        #[clap(long)]
        samples: String,
        /// Output path pattern in Handlebars format, e.g.
        /// "previews/{{list_profile_id}}.eml".
        #[clap(long)]
        out: String,
        /// Settings file.
        #[clap(long, default_value = "mergetag.yml")]
        config: PathBuf,
        /// Base path for relative output paths.
        #[clap(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

fn main() {
    let args = Args::parse();
    if let Err(e) = simple_logger::init_with_level(if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    }) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(args.command) {
        log::error!("Failed: {:?}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Fill { template, vars } => {
            let editor = data::load_template(template)?;
            let vars = data::load_variables(vars)?;
            print_rendered(
                &fill_template(&editor.subject, &vars),
                &fill_template(&editor.body, &vars),
            );
        }
        Command::Klaviyo { template, table } => {
            let editor = data::load_template(template)?;
            let defaults = data::load_table(table)?.default_values();
            print_rendered(
                &convert_to_klaviyo(&editor.subject, &defaults)?,
                &convert_to_klaviyo(&editor.body, &defaults)?,
            );
        }
        Command::Vars {
            table,
            descriptions,
        } => {
            let table = data::load_table(table)?;
            let vars = if descriptions {
                table.descriptions()
            } else {
                table.default_values()
            };
            log::debug!(
                "Built {} map with {} entries",
                if descriptions {
                    VariableField::Description.column()
                } else {
                    VariableField::DefaultValue.column()
                },
                vars.len()
            );
            println!(
                "{}",
                serde_json::to_string_pretty(&JsonValue::from(Value::Map(vars)))?
            );
        }
        Command::Placeholders { template } => {
            let editor = data::load_template(template)?;
            let subject = extract_placeholders(&editor.subject);
            let body = extract_placeholders(&editor.body);
            for placeholder in subject.iter().chain(body.iter()) {
                match &placeholder.default {
                    Some(default) => println!("{} (default: {:?})", placeholder.key, default),
                    None => println!("{}", placeholder.key),
                }
            }
        }
        Command::Preview {
            template,
            samples,
            out,
            config,
            output_dir,
        } => {
            let settings = Settings::load(config)?;
            let editor = data::load_template(template)?;
            let samples = data::load_rows(&samples)?;
            let count = preview::render_previews(
                &editor.subject,
                &editor.body,
                &samples,
                &settings.test_fields,
                &out,
                &output_dir,
            )?;
            log::info!("Rendered {} preview(s)", count);
        }
    }
    Ok(())
}

fn print_rendered(subject: &str, body: &str) {
    if !subject.is_empty() {
        println!("Subject: {}\n", subject);
    }
    print!("{}", body);
}
