//! MongoDB implementation of the patient history store.

use async_trait::async_trait;
use mongodb::bson::{doc, to_bson, Bson};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};
use tracing::{info, instrument};

use crate::config::MongoSettings;
use crate::db::HistoryStore;
use crate::error::StoreError;
use crate::models::{AppointmentSummary, PatientHistory};

const COLLECTION: &str = "patient_histories";

pub struct MongoHistoryStore {
    collection: Collection<PatientHistory>,
}

impl MongoHistoryStore {
    /// Connect and make sure the unique index on `patientEmail` exists; the
    /// index is what lets concurrent upserts for the same email collapse
    /// into one aggregate instead of creating two.
    pub async fn connect(settings: &MongoSettings) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(&settings.url).await?;
        let collection = client
            .database(&settings.database)
            .collection::<PatientHistory>(COLLECTION);

        collection
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "patientEmail": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        info!(database = %settings.database, "document store ready");
        Ok(Self { collection })
    }

    pub fn new(collection: Collection<PatientHistory>) -> Self {
        Self { collection }
    }

    pub async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<PatientHistory>, StoreError> {
        let history = self
            .collection
            .find_one(doc! { "patientEmail": email })
            .await?;
        Ok(history)
    }
}

#[async_trait]
impl HistoryStore for MongoHistoryStore {
    /// One atomic server-side upsert: `$setOnInsert` keeps the patient name
    /// from the first row ever seen, `$addToSet` adds the summary only when
    /// no deeply-equal entry is already in the collection.
    #[instrument(skip(self, patient_name, entry))]
    async fn upsert_history(
        &self,
        patient_email: Option<&str>,
        patient_name: Option<&str>,
        entry: &AppointmentSummary,
    ) -> Result<(), StoreError> {
        let email = patient_email.map_or(Bson::Null, |e| Bson::String(e.to_string()));
        let name = patient_name.map_or(Bson::Null, |n| Bson::String(n.to_string()));

        self.collection
            .update_one(
                doc! { "patientEmail": email },
                doc! {
                    "$setOnInsert": { "patientName": name },
                    "$addToSet": { "appointments": to_bson(entry)? },
                },
            )
            .upsert(true)
            .await?;
        Ok(())
    }
}
