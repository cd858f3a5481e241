//! Test helpers writing small, hand-checkable artefacts to disk.

use camino::{Utf8Path, Utf8PathBuf};
use course_match_scorer::{
    Activation, AgeScalerParams, DenseLayer, ENCODERS_FILE, Embedding, EncoderArtefact,
    MODEL_FILE, TwoTowerWeights, write_encoders, write_model,
};
use tempfile::TempDir;

/// Temporary directory holding a valid `encoders.json` and `model.bin`.
///
/// Embeddings are one-hot pairs, so scores can be checked by hand: the
/// learner vector is `track + mean(history)`, the course vector is
/// `course + subject` and the confidence is `sigmoid(learner · course)`.
#[derive(Debug)]
pub(super) struct ArtefactWorkspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl ArtefactWorkspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        write_encoders(&root.join(ENCODERS_FILE), &encoder_artefact()).expect("write encoders");
        write_model(&root.join(MODEL_FILE), &weights()).expect("write model");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        write_utf8(&path, contents.as_bytes());
        path
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write file");
}

pub(super) fn encoder_artefact() -> EncoderArtefact {
    EncoderArtefact {
        track: vec!["Sciences Maths (SM)".to_owned(), "Sciences SVT".to_owned()],
        subject: vec!["Mathematiques".to_owned(), "SVT".to_owned()],
        course: vec![
            "Course A".to_owned(),
            "Course B".to_owned(),
            "Course C".to_owned(),
        ],
        age_scaler: AgeScalerParams {
            mean: 17.0,
            scale: 1.0,
        },
        max_history_len: 10,
    }
}

fn weights() -> TwoTowerWeights {
    TwoTowerWeights {
        track_embedding: Embedding {
            rows: 3,
            dim: 2,
            values: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        },
        course_embedding: Embedding {
            rows: 4,
            dim: 2,
            values: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        },
        subject_embedding: Embedding {
            rows: 3,
            dim: 2,
            values: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        },
        learner_layers: vec![DenseLayer {
            input: 5,
            output: 2,
            weights: vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            bias: vec![0.0, 0.0],
            activation: Activation::Linear,
        }],
        course_layers: vec![DenseLayer {
            input: 4,
            output: 2,
            weights: vec![1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0],
            bias: vec![0.0, 0.0],
            activation: Activation::Linear,
        }],
        output_bias: 0.0,
    }
}

pub(super) const SVT_REQUEST: &str = r#"{
    "learner_track": "Sciences SVT",
    "learner_age": 17.0,
    "learner_history": ["Course A"],
    "target_course_name": "Course B",
    "target_subject": "SVT"
}"#;

pub(super) const UNKNOWN_COURSE_REQUEST: &str = r#"{
    "learner_track": "Sciences SVT",
    "learner_age": 17.0,
    "learner_history": [],
    "target_course_name": "Course Z",
    "target_subject": "SVT"
}"#;

pub(super) const MATHS_BATCH: &str = r#"{
    "learner": {"track": "SM", "history": []},
    "candidates": [
        {"id": 1, "title": "Course B", "subject": "SVT"},
        {"id": 2, "title": "Course C", "subject": "SVT"},
        {"id": 3, "title": "Course A", "subject": "Mathématiques"},
        {"id": 4, "title": "Course Z", "subject": "SVT"},
        {"id": 5, "title": "Course A", "subject": "Mathématiques", "completed": true},
        {"id": 6, "title": "Course C"}
    ]
}"#;
