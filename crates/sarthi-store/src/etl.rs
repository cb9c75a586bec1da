//! One-shot ETL that seeds the knowledge base.
//!
//! Public agronomy portals are form-driven and unstable, so the ETL
//! loads curated facts for the Jaipur pilot instead of scraping. Tables
//! are replaced wholesale, making re-runs idempotent.

use tracing::info;

use crate::sqlite::KnowledgeStore;
use crate::types::*;
use sarthi_core::{Error, Result};

/// Row counts loaded by an ETL run.
#[derive(Debug, Clone, Copy)]
pub struct EtlReport {
    pub crops: usize,
    pub soils: usize,
    pub pests: usize,
    pub schemes: usize,
}

fn crop_seed_rows() -> Vec<CropRecord> {
    vec![
        CropRecord {
            crop: "Wheat".into(),
            location: "Jaipur, Rajasthan".into(),
            season: Some("Rabi".into()),
            sowing_period: Some("November - December".into()),
            harvesting_period: Some("March - April".into()),
            irrigation_schedule: Some(
                "First irrigation 20-25 days after sowing, then every 20-25 days depending on rainfall"
                    .into(),
            ),
            fertilizer: Some(
                "Apply 120 kg N, 60 kg P2O5, 40 kg K2O per hectare in splits as per soil test".into(),
            ),
            pests: Some("Aphids, Rust; consider timely monitoring and IPM practices".into()),
        },
        CropRecord {
            crop: "Mustard".into(),
            location: "Jaipur, Rajasthan".into(),
            season: Some("Rabi".into()),
            sowing_period: Some("October - November".into()),
            harvesting_period: Some("February - March".into()),
            irrigation_schedule: Some(
                "First irrigation 25-30 days after sowing, critical stages at flowering and pod formation"
                    .into(),
            ),
            fertilizer: Some(
                "Apply 60 kg N, 40 kg P2O5, 20 kg K2O per hectare in splits as per soil test".into(),
            ),
            pests: Some("Aphids, Alternaria blight; adopt IPM and timely sprays if required".into()),
        },
    ]
}

fn soil_seed_rows() -> Vec<SoilRecord> {
    vec![SoilRecord {
        location: "Jaipur, Rajasthan".into(),
        soil_type: Some("Sandy loam to loam".into()),
        ph_min: Some(6.5),
        ph_max: Some(8.0),
        n_status: Some("Low to Medium".into()),
        p_status: Some("Low to Medium".into()),
        k_status: Some("Medium".into()),
    }]
}

fn pest_seed_rows() -> Vec<PestRecord> {
    vec![
        PestRecord {
            pest_name: "White Grub (सफ़ेद लट)".into(),
            affected_crop: "Mustard".into(),
            symptoms: "Roots eaten, plant wilting, sudden drying of plants. \
                       जड़ें खाई हुई, पौधा मुरझा रहा है, अचानक सूखना।"
                .into(),
            management_advice: "Apply Phorate 10G granules at 10 kg/ha before sowing. \
                                बुवाई से पहले फोरेट 10जी दाने 10 किग्रा/हेक्टेयर की दर से प्रयोग करें।"
                .into(),
        },
        PestRecord {
            pest_name: "Aphids (माहू or चैंपा)".into(),
            affected_crop: "Wheat".into(),
            symptoms: "Yellowing of leaves, sticky honeydew secretion, black sooty mold. \
                       पत्तियों का पीला पड़ना, चिपचिपा स्राव, काला कवक।"
                .into(),
            management_advice: "Spray Imidacloprid 17.8% SL at 1 ml/litre of water. \
                                इमिडाक्लोप्रिड 17.8% एसएल का 1 मिली/लीटर पानी में घोलकर छिड़काव करें।"
                .into(),
        },
    ]
}

fn scheme_seed_rows() -> Vec<SchemeRecord> {
    vec![
        SchemeRecord {
            scheme_name: "PM-KISAN".into(),
            purpose: Some("Income support for land-holding farmer families".into()),
            eligibility: Some("All land-holding farmer families, subject to exclusion criteria".into()),
            benefits: Some("Rs 6000 per year in three equal instalments".into()),
            how_to_apply: Some(
                "Register at the nearest CSC or on pmkisan.gov.in with Aadhaar and land records".into(),
            ),
        },
        SchemeRecord {
            scheme_name: "Pradhan Mantri Fasal Bima Yojana (PMFBY)".into(),
            purpose: Some("Crop insurance against natural calamities, pests and diseases".into()),
            eligibility: Some("Farmers growing notified crops in notified areas, loanee and non-loanee".into()),
            benefits: Some("Insurance cover at low premium: 1.5% for Rabi, 2% for Kharif crops".into()),
            how_to_apply: Some(
                "Enrol through banks, CSCs or pmfby.gov.in before the seasonal cut-off date".into(),
            ),
        },
    ]
}

/// Seed all four advisory tables, replacing prior contents.
pub fn run_etl(store: &KnowledgeStore) -> Result<EtlReport> {
    let crops = crop_seed_rows();
    let soils = soil_seed_rows();
    let pests = pest_seed_rows();
    let schemes = scheme_seed_rows();

    if crops.is_empty() {
        return Err(Error::Etl("no crop data collected".into()));
    }
    if soils.is_empty() {
        return Err(Error::Etl("no soil data collected".into()));
    }

    let report = EtlReport {
        crops: store.replace_crops(&crops)?,
        soils: store.replace_soil(&soils)?,
        pests: store.replace_pests(&pests)?,
        schemes: store.replace_schemes(&schemes)?,
    };

    info!(
        "ETL complete: {} crop rows, {} soil rows, {} pest rows, {} scheme rows",
        report.crops, report.soils, report.pests, report.schemes
    );
    Ok(report)
}
