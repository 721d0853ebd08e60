//! Minimally valid sample data for each step, for tests.

use serde_json::{Map, Value, json};
use strum::IntoEnumIterator;

use crate::{Step, application::NewApplication, schema};

fn object(value: Value) -> Map<String, Value> {
  match value {
    Value::Object(map) => map,
    _ => Map::new(),
  }
}

/// Sample input for `step`, as a user would submit it.
pub fn step_data(step: Step) -> Map<String, Value> {
  object(match step {
    Step::Student => json!({
      "studentFirstName": "Amara",
      "studentLastName": "Okafor",
      "dateOfBirth": "2015-04-02",
      "gender": "female",
      "nationality": "Kenyan",
      "languages": ["English", "Swahili"],
    }),
    Step::Address => json!({
      "currentAddress": {
        "street": "12 Ngong Road",
        "city": "Nairobi",
        "state": "Nairobi County",
        "country": "Kenya",
        "postalCode": "00100",
      },
      "sameAsCurrent": true,
    }),
    Step::Guardians => json!({
      "parents": [{
        "firstName": "Ngozi",
        "lastName": "Okafor",
        "relationship": "Mother",
        "email": "ngozi.okafor@example.com",
        "phone": "+254700000001",
      }],
    }),
    Step::Medical => json!({
      "physicianDetails": {
        "name": "Dr. Wanjiru Kamau",
        "hospital": "Nairobi Hospital",
        "phone": "+254700000100",
        "address": "Argwings Kodhek Road",
      },
    }),
    Step::Education => json!({
      "previousSchools": [{
        "name": "Hillcrest Preparatory",
        "address": "Langata Road",
        "startDate": "2020-01-06",
        "endDate": "2023-12-01",
        "grades": "1-3",
      }],
    }),
    Step::EmergencyBanking => json!({
      "emergencyContacts": [{
        "name": "Ifeoma Okafor",
        "relationship": "Aunt",
        "phone": "+254700000002",
      }],
      "invoiceTo": "home",
      "bankingDetails": {
        "accountHolder": "Ngozi Okafor",
        "bankName": "Equity Bank",
        "accountNumber": "0123456789",
        "branchCode": "068",
      },
    }),
    Step::Terms => json!({
      "termsAccepted": {
        "medical": true,
        "photo": true,
        "fieldTrip": true,
        "policies": true,
      },
    }),
  })
}

/// The union of every step's sample data.
pub fn application_fields() -> Map<String, Value> {
  let mut fields = Map::new();
  for step in Step::iter() {
    fields.extend(step_data(step));
  }
  fields
}

/// The sample data decoded as a [`NewApplication`].
pub fn new_application() -> NewApplication {
  match schema::validate_application(&application_fields()) {
    Ok(application) => application,
    Err(e) => panic!("sample application is invalid: {e}"),
  }
}
