use log::{debug, info};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::index::{FlatIndex, IndexError};
use crate::llm::memory::{ConversationMemory, Role};
use crate::processor::metadata::{generate_metadata, ResumeMetadata};
use crate::processor::{chunk_text, extract_text, truncate_chars, ProcessorError};
use crate::providers::traits::CompletionProvider;

/// Query terms that signal comparison/enumeration intent across the whole
/// collection. Heuristic defaults, matched as substrings of the lowercased
/// query.
pub const CROSS_RESUME_KEYWORDS: &[&str] = &[
    "who",
    "which candidate",
    "compare",
    "all",
    "everyone",
    "anyone",
    "best",
    "most",
    "candidates",
    "people",
    "resumes",
    "group",
    "among",
    "between",
    "across",
];

pub const NO_RESUMES_MESSAGE: &str =
    "No resumes have been uploaded yet. Please upload some resumes first to start querying.";

const HR_SYSTEM_PROMPT: &str = "You are an expert HR assistant helping to analyze and answer questions about a collection of resumes.\n\
You have access to detailed resume information including skills, experience, education, and work history.\n\
When comparing candidates, be objective and cite specific information from their resumes.\n\
When asked about specific individuals, provide detailed and accurate information.\n\
Always base your answers on the provided context and indicate if information is not available.";

const SUMMARY_SYSTEM_PROMPT: &str =
    "You are an expert HR professional creating comprehensive candidate summaries.";

/// Turns of conversation history threaded into each query prompt.
const MEMORY_CONTEXT_TURNS: usize = 4;
/// Top-k for the two retrieval strategies.
const CROSS_RESUME_TOP_K: usize = 6;
const SINGLE_RESUME_TOP_K: usize = 4;
/// Resume text budget for the detailed summary prompt.
const SUMMARY_TEXT_CHARS: usize = 6000;

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error("embedding failed: {0}")]
    Embedding(String),
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// One stored resume: immutable extracted text, its metadata, and the
/// enriched chunks derived from the text at creation time.
pub struct ResumeRecord {
    pub text: String,
    pub metadata: ResumeMetadata,
    pub chunks: Vec<String>,
}

struct ResumeEntry {
    id: String,
    record: ResumeRecord,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub resume_id: String,
    pub chunk: String,
    pub distance: f32,
}

/// A search hit enriched with the owning resume's metadata and a display
/// form of the chunk.
#[derive(Debug, Clone)]
pub struct MetadataSearchHit {
    pub resume_id: String,
    pub chunk: String,
    /// Full document header the first time a resume appears in a result
    /// set; lighter inline tag for its further chunks.
    pub formatted: String,
    pub distance: f32,
    pub metadata: ResumeMetadata,
}

/// Owns the resume records, the global chunk table, and the vector index,
/// and implements retrieval-strategy selection and prompt assembly.
/// Single-caller, request/response; every mutation rebuilds the chunk
/// table and index wholesale, so a search never observes a partially
/// added or removed document.
pub struct ResumeManager {
    provider: Arc<dyn CompletionProvider>,
    entries: Vec<ResumeEntry>,
    all_chunks: Vec<String>,
    chunk_to_resume: Vec<String>,
    index: Option<FlatIndex>,
    chunk_size: usize,
    chunk_overlap: usize,
    conversation: ConversationMemory,
}

impl ResumeManager {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &AppConfig) -> Self {
        Self {
            provider,
            entries: Vec::new(),
            all_chunks: Vec::new(),
            chunk_to_resume: Vec::new(),
            index: None,
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            conversation: ConversationMemory::new(config.memory_max_turns),
        }
    }

    /// Extract, analyze, chunk, and index a new resume from raw bytes.
    pub async fn add_resume(
        &mut self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<(String, ResumeMetadata), ManagerError> {
        let text = extract_text(bytes, filename)?;
        self.add_resume_text(text, filename).await
    }

    /// Ingest a resume whose text is already extracted. This is the entry
    /// point for callers that run the validation gate between extraction
    /// and ingestion.
    pub async fn add_resume_text(
        &mut self,
        text: String,
        filename: &str,
    ) -> Result<(String, ResumeMetadata), ManagerError> {
        let metadata = generate_metadata(self.provider.as_ref(), &text, filename).await;
        let resume_id = self.generate_resume_id(filename);

        // Tag every chunk with its owner so retrieval results are
        // self-describing out of document context.
        let chunks: Vec<String> = chunk_text(&text, self.chunk_size, self.chunk_overlap)
            .into_iter()
            .map(|chunk| format!("[Resume: {}]\n{}", metadata.candidate_name, chunk))
            .collect();

        self.entries.push(ResumeEntry {
            id: resume_id.clone(),
            record: ResumeRecord {
                text,
                metadata: metadata.clone(),
                chunks,
            },
        });

        if let Err(e) = self.rebuild_index().await {
            // Keep the store consistent with the still-standing old index.
            self.entries.pop();
            return Err(e);
        }

        info!(
            "added resume {} ({}), {} chunks total",
            resume_id,
            metadata.candidate_name,
            self.all_chunks.len()
        );
        Ok((resume_id, metadata))
    }

    /// Remove a resume. Unknown ids are not an error; `Ok(false)` comes
    /// back and the store is untouched.
    pub async fn remove_resume(&mut self, resume_id: &str) -> Result<bool, ManagerError> {
        let Some(position) = self.entries.iter().position(|e| e.id == resume_id) else {
            return Ok(false);
        };
        let removed = self.entries.remove(position);
        if let Err(e) = self.rebuild_index().await {
            self.entries.insert(position, removed);
            return Err(e);
        }
        info!("removed resume {}", resume_id);
        Ok(true)
    }

    /// Recompute the chunk table and chunk-to-resume map from all stored
    /// resumes in insertion order, then replace the index in one step.
    /// An empty table leaves the index absent rather than empty.
    pub async fn rebuild_index(&mut self) -> Result<(), ManagerError> {
        let mut chunks = Vec::new();
        let mut chunk_map = Vec::new();
        for entry in &self.entries {
            for chunk in &entry.record.chunks {
                chunks.push(chunk.clone());
                chunk_map.push(entry.id.clone());
            }
        }

        let index = if chunks.is_empty() {
            None
        } else {
            let mut vectors = Vec::with_capacity(chunks.len());
            for chunk in &chunks {
                let vector = self
                    .provider
                    .generate_embedding(chunk)
                    .await
                    .map_err(|e| ManagerError::Embedding(e.to_string()))?;
                vectors.push(vector);
            }
            Some(FlatIndex::build(vectors)?)
        };

        self.all_chunks = chunks;
        self.chunk_to_resume = chunk_map;
        self.index = index;
        debug!("index rebuilt: {} chunks", self.all_chunks.len());
        Ok(())
    }

    /// Top-k nearest chunks across all resumes, ascending by squared L2
    /// distance. Empty result set against an absent index.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, ManagerError> {
        let Some(index) = &self.index else {
            return Ok(Vec::new());
        };

        let query_vector = self
            .provider
            .generate_embedding(query)
            .await
            .map_err(|e| ManagerError::Embedding(e.to_string()))?;

        let hits = index.search(&query_vector, k)?;
        Ok(hits
            .into_iter()
            .map(|(position, distance)| SearchHit {
                resume_id: self.chunk_to_resume[position].clone(),
                chunk: self.all_chunks[position].clone(),
                distance,
            })
            .collect())
    }

    /// Search with each hit enriched by the owning resume's metadata. The
    /// full header appears only on a resume's first hit in the result set
    /// to keep repeated headers out of assembled contexts.
    pub async fn search_with_metadata(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<MetadataSearchHit>, ManagerError> {
        let hits = self.search(query, k).await?;
        let mut seen: HashSet<String> = HashSet::new();

        Ok(hits
            .into_iter()
            .map(|hit| {
                let metadata = self
                    .get_metadata(&hit.resume_id)
                    .cloned()
                    .unwrap_or_else(|| ResumeMetadata::defaults(&hit.resume_id));
                let formatted = if seen.insert(hit.resume_id.clone()) {
                    format!(
                        "=== {} | {} ({} years) ===\n{}",
                        metadata.candidate_name,
                        metadata.current_role,
                        metadata.experience_years,
                        hit.chunk
                    )
                } else {
                    format!("[{}] {}", metadata.candidate_name, hit.chunk)
                };
                MetadataSearchHit {
                    resume_id: hit.resume_id,
                    chunk: hit.chunk,
                    formatted,
                    distance: hit.distance,
                    metadata,
                }
            })
            .collect())
    }

    /// Answer a question over the stored resumes. Never fails: provider
    /// errors come back as a user-visible message in place of an answer.
    pub async fn query(&mut self, user_query: &str) -> String {
        if self.entries.is_empty() {
            return NO_RESUMES_MESSAGE.to_string();
        }

        // Comparison/enumeration questions need visibility into every
        // resume regardless of embedding similarity, so they get the
        // overview context on top of retrieval.
        let context = if Self::is_cross_resume_query(user_query) {
            match self.build_cross_resume_context(user_query).await {
                Ok(context) => context,
                Err(e) => return format!("Error generating response: {}", e),
            }
        } else {
            match self.search(user_query, SINGLE_RESUME_TOP_K).await {
                Ok(hits) => hits
                    .into_iter()
                    .map(|hit| hit.chunk)
                    .collect::<Vec<_>>()
                    .join("\n\n"),
                Err(e) => return format!("Error generating response: {}", e),
            }
        };

        let history = self.conversation.get_context(MEMORY_CONTEXT_TURNS);
        let user_message = format!(
            "Context from resumes:\n{}\n\nCurrent question: {}\n\n\
             Please provide a helpful, accurate answer based on the resume information provided.",
            context, user_query
        );

        match self
            .provider
            .chat(HR_SYSTEM_PROMPT, &history, &user_message)
            .await
        {
            Ok(answer) => {
                self.conversation.add(Role::User, user_query);
                self.conversation.add(Role::Assistant, &answer);
                answer
            }
            Err(e) => format!("Error generating response: {}", e),
        }
    }

    /// Generate a detailed professional summary for one resume.
    pub async fn summarize_resume(&self, resume_id: &str) -> String {
        let Some(entry) = self.entries.iter().find(|e| e.id == resume_id) else {
            return format!("Resume with ID '{}' not found.", resume_id);
        };

        let metadata = &entry.record.metadata;
        let prompt = format!(
            "Please provide a comprehensive professional summary for this candidate:\n\n\
             Name: {}\n\
             Current Role: {}\n\
             Experience: {} years\n\
             Education: {}\n\
             Key Skills: {}\n\n\
             Full Resume Text:\n{}\n\n\
             Provide a 3-4 paragraph summary covering:\n\
             1. Professional background and expertise\n\
             2. Key achievements and notable experience\n\
             3. Technical skills and competencies\n\
             4. Overall assessment and potential fit for technical roles",
            metadata.candidate_name,
            metadata.current_role,
            metadata.experience_years,
            metadata.education,
            metadata.key_skills.join(", "),
            truncate_chars(&entry.record.text, SUMMARY_TEXT_CHARS)
        );

        match self.provider.complete(SUMMARY_SYSTEM_PROMPT, &prompt).await {
            Ok(summary) => summary,
            Err(e) => format!("Error generating summary: {}", e),
        }
    }

    /// All candidates whose extracted skills or full text mention the
    /// skill, case-insensitively.
    pub fn find_candidates_with_skill(&self, skill: &str) -> Vec<(String, ResumeMetadata)> {
        let skill_lower = skill.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| {
                let in_skills = entry
                    .record
                    .metadata
                    .key_skills
                    .iter()
                    .any(|s| s.to_lowercase().contains(&skill_lower));
                in_skills || entry.record.text.to_lowercase().contains(&skill_lower)
            })
            .map(|entry| (entry.id.clone(), entry.record.metadata.clone()))
            .collect()
    }

    pub fn get_all_metadata(&self) -> Vec<(String, ResumeMetadata)> {
        self.entries
            .iter()
            .map(|entry| (entry.id.clone(), entry.record.metadata.clone()))
            .collect()
    }

    pub fn get_metadata(&self, resume_id: &str) -> Option<&ResumeMetadata> {
        self.entries
            .iter()
            .find(|e| e.id == resume_id)
            .map(|e| &e.record.metadata)
    }

    pub fn resume_count(&self) -> usize {
        self.entries.len()
    }

    pub fn chunk_table(&self) -> &[String] {
        &self.all_chunks
    }

    pub fn chunk_map(&self) -> &[String] {
        &self.chunk_to_resume
    }

    pub fn conversation_len(&self) -> usize {
        self.conversation.len()
    }

    /// Start a fresh conversation without touching the stored resumes.
    pub fn clear_conversation(&mut self) {
        self.conversation.clear();
    }

    /// Drop every resume, the chunk table, the index, and the conversation.
    pub fn clear_all_resumes(&mut self) {
        self.entries.clear();
        self.all_chunks.clear();
        self.chunk_to_resume.clear();
        self.index = None;
        self.conversation.clear();
    }

    pub fn is_cross_resume_query(query: &str) -> bool {
        let lower = query.to_lowercase();
        CROSS_RESUME_KEYWORDS.iter().any(|kw| lower.contains(kw))
    }

    /// Context for comparison/enumeration queries: a one-line-per-resume
    /// overview of the whole collection, then deduplicated (first chunk
    /// per resume) retrieval results.
    async fn build_cross_resume_context(&self, query: &str) -> Result<String, ManagerError> {
        let mut context = String::from("=== Resume Database Overview ===\n");
        for entry in &self.entries {
            let metadata = &entry.record.metadata;
            context.push_str(&format!(
                "\n{}\n   Role: {}\n   Experience: {} years\n   Skills: {}\n   Industries: {}\n",
                metadata.candidate_name,
                metadata.current_role,
                metadata.experience_years,
                metadata
                    .key_skills
                    .iter()
                    .take(10)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
                metadata
                    .industries
                    .iter()
                    .take(5)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            ));
        }

        let hits = self.search(query, CROSS_RESUME_TOP_K).await?;
        context.push_str("\n=== Relevant Resume Sections ===\n");
        let mut seen: HashSet<String> = HashSet::new();
        for hit in hits {
            if seen.insert(hit.resume_id) {
                context.push_str(&format!("\n{}\n", hit.chunk));
            }
        }

        Ok(context)
    }

    /// Filename-derived id, de-duplicated with a numeric suffix.
    fn generate_resume_id(&self, filename: &str) -> String {
        let base_id = filename.replace(' ', "_").replace('.', "_");
        let mut resume_id = base_id.clone();
        let mut counter = 1;
        while self.entries.iter().any(|e| e.id == resume_id) {
            resume_id = format!("{}_{}", base_id, counter);
            counter += 1;
        }
        resume_id
    }
}
