use bloodbank::{
    BloodGroup, Id, Store,
    domain::{Availability, NewDonor},
    storage::FileBackend,
};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Register a donor
    Add {
        /// Full name
        name: String,

        /// Blood group, e.g. O+ or ab-
        blood_group: BloodGroup,

        /// Contact number
        phone: String,

        /// City of residence
        #[arg(long)]
        city: Option<String>,

        /// Register the donor as currently unavailable
        #[arg(long)]
        unavailable: bool,
    },

    /// List donors
    List {
        /// Only donors of this blood group
        #[arg(long)]
        group: Option<BloodGroup>,

        /// Only donors whose city contains this text
        #[arg(long)]
        city: Option<String>,
    },

    /// Flip a donor between available and unavailable
    Toggle {
        /// The donor to update
        id: Id,
    },
}

impl Command {
    #[instrument(skip(store))]
    pub fn run(self, store: &mut Store<FileBackend>) -> anyhow::Result<()> {
        match self {
            Self::Add {
                name,
                blood_group,
                phone,
                city,
                unavailable,
            } => {
                let donor = store.add_donor(NewDonor {
                    name,
                    blood_group: Some(blood_group),
                    phone,
                    city,
                    availability: if unavailable {
                        Availability::Unavailable
                    } else {
                        Availability::Available
                    },
                })?;
                println!("{}", format!("Registered donor {}", donor.id).success());
            }
            Self::List { group, city } => {
                let donors = store.list_donors(group, city.as_deref());
                if donors.is_empty() {
                    println!("No donors matched.");
                }
                for donor in donors {
                    let availability = match donor.availability {
                        Availability::Available => donor.availability.to_string().success(),
                        Availability::Unavailable => donor.availability.to_string().dim(),
                    };
                    println!(
                        "{} {:<3} {} {} {} {availability}",
                        donor.id.as_str().info(),
                        donor.blood_group,
                        donor.name,
                        donor.phone,
                        donor.city.as_deref().unwrap_or("-"),
                    );
                }
            }
            Self::Toggle { id } => {
                let donor = store.toggle_donor_availability(&id)?;
                println!(
                    "{}",
                    format!("{} is now {}", donor.name, donor.availability).success()
                );
            }
        }
        Ok(())
    }
}
