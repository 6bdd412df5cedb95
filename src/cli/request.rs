use bloodbank::{
    BloodGroup, Id, Store,
    domain::{NewRequest, Request},
    storage::FileBackend,
};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Raise a request for blood
    Add {
        /// Patient or contact name
        name: String,

        /// Blood group needed
        blood_group: BloodGroup,

        /// Contact number
        phone: String,

        /// Units needed
        #[arg(long, default_value_t = 1)]
        units: u32,

        /// City where the blood is needed
        #[arg(long)]
        city: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List open requests, newest first
    List {
        /// Only requests whose blood group or city contains this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Show the most recent open requests
    Recent,

    /// Mark a request as fulfilled
    ///
    /// Bank stock is not changed; use `fulfill` to draw units.
    Fulfill {
        /// The request to close
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
                units,
                city,
                notes,
            } => {
                let request = store.add_request(NewRequest {
                    name,
                    blood_group: Some(blood_group),
                    phone,
                    units,
                    city,
                    notes,
                })?;
                println!("{}", format!("Raised request {}", request.id).success());
            }
            Self::List { search } => print_requests(&store.list_requests(search.as_deref())),
            Self::Recent => print_requests(&store.recent_requests()),
            Self::Fulfill { id } => {
                let request = store.fulfill_request(&id)?;
                println!(
                    "{}",
                    format!("Request {} is {}", request.id, request.status).success()
                );
            }
        }
        Ok(())
    }
}

fn print_requests(requests: &[Request]) {
    if requests.is_empty() {
        println!("No open requests.");
    }
    for request in requests {
        println!(
            "{} {:<3} x{} {} {} {} {}",
            request.id.as_str().info(),
            request.blood_group,
            request.units,
            request.name,
            request.phone,
            request.city.as_deref().unwrap_or("-"),
            request.created.format("%Y-%m-%d %H:%M").to_string().dim(),
        );
        if let Some(notes) = &request.notes {
            println!("    {}", notes.dim());
        }
    }
}
