use crate::api_client::ApiClient;
use crate::errors::ApiError;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;

// --- CV resource types ---

/// Fields the client writes when creating or replacing a CV.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CvPayload {
    pub title: String,
    #[serde(default)]
    pub template: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub summary: String,
}

/// A CV as read back from the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cv {
    pub id: i64,
    #[serde(flatten)]
    pub payload: CvPayload,
    #[serde(default)]
    pub ai_rating: Option<i32>,
    #[serde(default)]
    pub ai_review: Option<Value>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    pub message: String,
    pub analysis: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DuplicateResponse {
    pub message: String,
    pub cv: Cv,
}

// --- CV section types ---
//
// Each section read type is its write payload plus a server-assigned id, so
// the payload is flattened into the read type.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkExperiencePayload {
    pub cv: i64,
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub location: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    pub description: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkExperience {
    pub id: i64,
    #[serde(flatten)]
    pub payload: WorkExperiencePayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationPayload {
    pub cv: i64,
    pub institution: String,
    pub degree: String,
    #[serde(default)]
    pub field_of_study: String,
    #[serde(default)]
    pub location: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub id: i64,
    #[serde(flatten)]
    pub payload: EducationPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillPayload {
    pub cv: i64,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub id: i64,
    #[serde(flatten)]
    pub payload: SkillPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectPayload {
    pub cv: i64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub technologies: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    #[serde(flatten)]
    pub payload: ProjectPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificationPayload {
    pub cv: i64,
    pub name: String,
    pub issuing_organization: String,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub credential_id: String,
    #[serde(default)]
    pub credential_url: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certification {
    pub id: i64,
    #[serde(flatten)]
    pub payload: CertificationPayload,
}

// --- Typed endpoint wrappers ---

/// CRUD plus the CV-specific actions on `/cvs/`.
#[derive(Clone)]
pub struct CvApi {
    api: ApiClient,
}

impl CvApi {
    pub fn new(api: ApiClient) -> Self {
        CvApi { api }
    }

    pub async fn list(&self) -> Result<Vec<Cv>, ApiError> {
        self.api.get("/cvs/").await
    }

    pub async fn get(&self, id: i64) -> Result<Cv, ApiError> {
        self.api.get(&format!("/cvs/{}/", id)).await
    }

    pub async fn create(&self, cv: &CvPayload) -> Result<Cv, ApiError> {
        self.api.post("/cvs/", cv).await
    }

    pub async fn update(&self, id: i64, cv: &CvPayload) -> Result<Cv, ApiError> {
        self.api.put(&format!("/cvs/{}/", id), cv).await
    }

    pub async fn partial_update(&self, id: i64, fields: &Value) -> Result<Cv, ApiError> {
        self.api.patch(&format!("/cvs/{}/", id), fields).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.api.delete(&format!("/cvs/{}/", id)).await
    }

    /// Asks the backend to run its AI review over the CV.
    pub async fn analyze(&self, id: i64) -> Result<AnalyzeResponse, ApiError> {
        self.api.post_empty(&format!("/cvs/{}/analyze/", id)).await
    }

    pub async fn duplicate(&self, id: i64) -> Result<DuplicateResponse, ApiError> {
        self.api
            .post_empty(&format!("/cvs/{}/duplicate/", id))
            .await
    }
}

/// Shared CRUD shape of the five CV section endpoints. Sections are listed
/// per CV and addressed by their own id for writes.
#[derive(Clone)]
pub struct SectionApi<T, P> {
    api: ApiClient,
    base: &'static str,
    _marker: PhantomData<fn() -> (T, P)>,
}

impl<T: DeserializeOwned, P: Serialize> SectionApi<T, P> {
    fn new(api: ApiClient, base: &'static str) -> Self {
        SectionApi {
            api,
            base,
            _marker: PhantomData,
        }
    }

    pub async fn list(&self, cv_id: i64) -> Result<Vec<T>, ApiError> {
        self.api.get(&format!("{}?cv_id={}", self.base, cv_id)).await
    }

    pub async fn create(&self, payload: &P) -> Result<T, ApiError> {
        self.api.post(self.base, payload).await
    }

    pub async fn update(&self, id: i64, payload: &P) -> Result<T, ApiError> {
        self.api.put(&format!("{}{}/", self.base, id), payload).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.api.delete(&format!("{}{}/", self.base, id)).await
    }
}

pub type WorkExperienceApi = SectionApi<WorkExperience, WorkExperiencePayload>;
pub type EducationApi = SectionApi<Education, EducationPayload>;
pub type SkillApi = SectionApi<Skill, SkillPayload>;
pub type ProjectApi = SectionApi<Project, ProjectPayload>;
pub type CertificationApi = SectionApi<Certification, CertificationPayload>;

/// One handle bundling every resource client over a shared `ApiClient`.
#[derive(Clone)]
pub struct Resources {
    pub cvs: CvApi,
    pub work_experience: WorkExperienceApi,
    pub education: EducationApi,
    pub skills: SkillApi,
    pub projects: ProjectApi,
    pub certifications: CertificationApi,
}

impl Resources {
    pub fn new(api: &ApiClient) -> Self {
        Resources {
            cvs: CvApi::new(api.clone()),
            work_experience: SectionApi::new(api.clone(), "/cvs/work-experience/"),
            education: SectionApi::new(api.clone(), "/cvs/education/"),
            skills: SectionApi::new(api.clone(), "/cvs/skills/"),
            projects: SectionApi::new(api.clone(), "/cvs/projects/"),
            certifications: SectionApi::new(api.clone(), "/cvs/certifications/"),
        }
    }
}
