use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use triage_core::constants::DEFAULT_MAX_RESULTS;
use triage_core::{
    CoreConfig, PatientProfile, Sex, TriageReport, TriageRequest, TriageResult, TriageService,
};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Symptom triage and doctor lookup CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank likely conditions for a set of symptoms
    Check {
        /// Symptoms; each argument may hold several, separated by commas
        #[arg(required = true)]
        symptoms: Vec<String>,
        /// Patient age in years
        #[arg(long)]
        age: Option<u8>,
        /// Patient sex (male or female)
        #[arg(long)]
        sex: Option<Sex>,
        /// Show every matching condition instead of the top three
        #[arg(long)]
        all: bool,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
        /// Condition catalog file (default: built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// List the conditions in the catalog
    Conditions {
        /// Condition catalog file (default: built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// List doctors, optionally in one city
    Doctors {
        /// Doctor directory file
        #[arg(long)]
        doctors: PathBuf,
        /// Only list doctors in this city
        #[arg(long)]
        city: Option<String>,
        /// Maximum number of doctors to list
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Recommend doctors in a city for a condition
    Recommend {
        /// Doctor directory file
        #[arg(long)]
        doctors: PathBuf,
        /// Condition name as listed in the catalog
        disease: String,
        /// City to search in
        city: String,
        /// Condition catalog file (default: built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// List distinct specializations in the doctor directory
    Specializations {
        /// Doctor directory file
        #[arg(long)]
        doctors: PathBuf,
    },
    /// List distinct cities in the doctor directory
    Cities {
        /// Doctor directory file
        #[arg(long)]
        doctors: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Check {
            symptoms,
            age,
            sex,
            all,
            json,
            catalog,
        }) => {
            let max_results = if all { usize::MAX } else { DEFAULT_MAX_RESULTS };
            let service = service(catalog, None, max_results)?;
            let profile = PatientProfile::new(age, sex)?;
            let request = TriageRequest::new(split_symptoms(&symptoms), profile);
            let report = service.assess(&request);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Some(Commands::Conditions { catalog }) => {
            let service = service(catalog, None, DEFAULT_MAX_RESULTS)?;
            for condition in service.catalog() {
                let symptoms: Vec<&str> = condition.symptoms.iter().map(|s| s.as_str()).collect();
                println!(
                    "{} ({}): {}",
                    condition.name,
                    condition.specialization,
                    symptoms.join(", ")
                );
            }
        }
        Some(Commands::Doctors {
            doctors,
            city,
            limit,
        }) => {
            let service = service(None, Some(doctors), DEFAULT_MAX_RESULTS)?;
            let listed = service.list_doctors(city.as_deref(), limit)?;
            if listed.is_empty() {
                println!("No doctors found.");
            }
            for doctor in listed {
                println!(
                    "{}, {} in {} (rating {}, {} years)",
                    doctor.name,
                    doctor.specialization,
                    doctor.city,
                    doctor.rating,
                    doctor.experience
                );
            }
        }
        Some(Commands::Recommend {
            doctors,
            disease,
            city,
            catalog,
        }) => {
            let service = service(catalog, Some(doctors), DEFAULT_MAX_RESULTS)?;
            for (rank, ranked) in service.recommend_doctors(&disease, &city)?.iter().enumerate() {
                let doctor = &ranked.doctor;
                println!(
                    "{}. {}, {} (score {:.2}, rating {}, {} years){}",
                    rank + 1,
                    doctor.name,
                    doctor.specialization,
                    ranked.score,
                    doctor.rating,
                    doctor.experience,
                    doctor
                        .hospital
                        .as_deref()
                        .map(|h| format!(" at {h}"))
                        .unwrap_or_default()
                );
            }
        }
        Some(Commands::Specializations { doctors }) => {
            let service = service(None, Some(doctors), DEFAULT_MAX_RESULTS)?;
            for specialization in service.specializations() {
                println!("{specialization}");
            }
        }
        Some(Commands::Cities { doctors }) => {
            let service = service(None, Some(doctors), DEFAULT_MAX_RESULTS)?;
            for city in service.cities() {
                println!("{city}");
            }
        }
        None => {
            println!("Use 'triage --help' for commands");
        }
    }

    Ok(())
}

fn service(
    catalog: Option<PathBuf>,
    doctors: Option<PathBuf>,
    max_results: usize,
) -> TriageResult<TriageService> {
    TriageService::new(Arc::new(CoreConfig::new(catalog, doctors, max_results)?))
}

/// Flatten arguments like `"Fever, Cough" Fatigue` into individual symptoms.
fn split_symptoms(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn print_report(report: &TriageReport) {
    if report.fallback {
        println!("No specific condition matched the symptoms provided.");
    }
    for condition in &report.conditions {
        println!(
            "{:>3}%  {} ({})",
            condition.display_percentage, condition.name, condition.specialization
        );
        if !condition.matching_symptoms.is_empty() {
            println!("      matched: {}", condition.matching_symptoms.join(", "));
        }
        if report.fallback {
            println!("      {}", condition.description);
            for tip in &condition.self_care {
                println!("      - {tip}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_comma_separated_symptoms() {
        let args = vec!["Fever, Cough".to_string(), " ".to_string(), "Fatigue".to_string()];
        assert_eq!(split_symptoms(&args), vec!["Fever", "Cough", "Fatigue"]);
    }

    #[test]
    fn parses_check_command() {
        let cli = Cli::try_parse_from(["triage", "check", "Fever", "--sex", "f", "--age", "30"])
            .expect("valid arguments");
        match cli.command {
            Some(Commands::Check {
                symptoms, age, sex, ..
            }) => {
                assert_eq!(symptoms, vec!["Fever"]);
                assert_eq!(age, Some(30));
                assert_eq!(sex, Some(Sex::Female));
            }
            _ => panic!("expected check command"),
        }
    }

    #[test]
    fn check_requires_symptoms() {
        assert!(Cli::try_parse_from(["triage", "check"]).is_err());
    }

    #[test]
    fn recommend_requires_directory() {
        assert!(Cli::try_parse_from(["triage", "recommend", "Asthma", "Pune"]).is_err());
    }
}
