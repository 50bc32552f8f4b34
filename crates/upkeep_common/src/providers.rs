//! Directory of local maintenance service providers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProvider {
    pub name: String,
    pub location: String,
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

impl ServiceProvider {
    fn new(name: &str, location: &str, services: &[&str], contact: &str, rating: f32) -> Self {
        Self {
            name: name.to_string(),
            location: location.to_string(),
            services: services.iter().map(|s| s.to_string()).collect(),
            contact: Some(contact.to_string()),
            rating: Some(rating),
        }
    }

    /// Case-insensitive substring match against any offered service
    pub fn offers(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        self.services
            .iter()
            .any(|s| s.to_lowercase().contains(&query))
    }

    pub fn located_in(&self, location: &str) -> bool {
        self.location
            .to_lowercase()
            .contains(&location.trim().to_lowercase())
    }
}

/// Built-in directory
pub fn directory() -> Vec<ServiceProvider> {
    vec![
        ServiceProvider::new(
            "AutoCare Lagos",
            "Victoria Island, Lagos",
            &["Brake Service", "AC Repair", "General Maintenance"],
            "+234 801 234 5678",
            4.5,
        ),
        ServiceProvider::new(
            "Generator Masters",
            "Ikeja, Lagos",
            &["Generator Repair", "Fuel System Cleaning", "Parts Supply"],
            "+234 803 456 7890",
            4.2,
        ),
        ServiceProvider::new(
            "Home Appliance Pro",
            "Lekki, Lagos",
            &["Refrigerator Repair", "AC Service", "Appliance Maintenance"],
            "+234 805 678 9012",
            4.7,
        ),
    ]
}

/// Providers offering `service`, optionally narrowed to a location
pub fn find_providers(service: &str, location: Option<&str>) -> Vec<ServiceProvider> {
    directory()
        .into_iter()
        .filter(|p| p.offers(service))
        .filter(|p| location.map_or(true, |l| p.located_in(l)))
        .collect()
}
