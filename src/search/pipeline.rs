//! The hybrid discovery pipeline.
//!
//! query → keyword extraction → multi-signal retrieval (lexical + vector,
//! fanned out) → reciprocal rank fusion → relevance filter → reconciliation
//! against the record store → ranked canonical records.
//!
//! The pipeline is an explicit engine object with injected collaborators,
//! so every external service can be substituted in tests. Batched input is
//! the internal representation; a single query is the size-1 case.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::completion::TextGeneration;
use crate::error::{Error, Result};
use crate::index::{IndexService, QueryTarget, Signal, SubQuery};
use crate::records::Agent;
use crate::search::embedding::EmbeddingProvider;
use crate::search::filter::filter_candidates;
use crate::search::fusion::{fuse, Candidate};
use crate::search::keywords::extract_keywords;
use crate::store::RecordStore;

/// Pipeline tuning knobs.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Reciprocal-rank-fusion smoothing coefficient.
    pub fusion_coeff: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { fusion_coeff: 100 }
    }
}

/// Hybrid discovery pipeline with injected collaborators.
pub struct SearchPipeline {
    store: Arc<dyn RecordStore>,
    index: Arc<dyn IndexService>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn TextGeneration>,
    options: SearchOptions,
}

impl SearchPipeline {
    /// Build a pipeline over the given collaborators.
    pub fn new(
        store: Arc<dyn RecordStore>,
        index: Arc<dyn IndexService>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn TextGeneration>,
        options: SearchOptions,
    ) -> Self {
        Self {
            store,
            index,
            embedder,
            llm,
            options,
        }
    }

    /// Search with a single query; the size-1 case of [`search_many`].
    ///
    /// [`search_many`]: Self::search_many
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Agent>> {
        let mut results = self.search_many(&[query.to_string()], limit).await?;
        Ok(results.pop().unwrap_or_default())
    }

    /// Run the full pipeline for a batch of queries, returning at most
    /// `limit` canonical agent records per query in relevance order.
    pub async fn search_many(&self, queries: &[String], limit: usize) -> Result<Vec<Vec<Agent>>> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }
        let limit = limit.max(1);

        // One extraction call covers the whole batch.
        let keyword_sets = extract_keywords(self.llm.as_ref(), queries).await?;

        let mut results = Vec::with_capacity(queries.len());
        for (query, keywords) in queries.iter().zip(&keyword_sets) {
            let candidates = self.retrieve_and_fuse(query, keywords, limit).await?;
            debug!(%query, candidates = candidates.len(), "fused candidate list");

            let kept = filter_candidates(self.llm.as_ref(), query, candidates).await;
            let agents = self.reconcile(kept, limit).await?;

            info!(%query, results = agents.len(), "search complete");
            results.push(agents);
        }

        Ok(results)
    }

    /// Multi-signal retrieval and rank fusion for one query.
    ///
    /// Issues the three sub-queries (lexical query→description, vector
    /// keywords→tags, lexical keywords→description), each bounded to
    /// `k_search = max(2 * limit, 10)`, then fuses to at most `limit`
    /// candidates. The combined index call is atomic: any backend failure
    /// surfaces as `RetrievalUnavailable`.
    async fn retrieve_and_fuse(
        &self,
        query: &str,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<Candidate>> {
        let keyword_text = keywords.join(" ");

        let keyword_vector = self
            .embedder
            .embed(std::slice::from_ref(&keyword_text))
            .await
            .map_err(|e| Error::retrieval("keyword embedding", e))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::retrieval("keyword embedding", "empty embedding batch"))?;

        let subs = [
            SubQuery {
                target: QueryTarget::Description,
                signal: Signal::Lexical(query.to_string()),
            },
            SubQuery {
                target: QueryTarget::Tags,
                signal: Signal::Vector(keyword_vector),
            },
            SubQuery {
                target: QueryTarget::Description,
                signal: Signal::Lexical(keyword_text),
            },
        ];

        let k_search = (2 * limit).max(10);
        let lists = self
            .index
            .query(&subs, k_search)
            .await
            .map_err(|e| Error::retrieval("multi-signal retrieval", e))?;

        Ok(fuse(&lists, self.options.fusion_coeff, limit))
    }

    /// Map surviving candidates back to canonical records.
    ///
    /// An index candidate without a canonical counterpart is an expected
    /// consistency gap between the two stores: it is logged and dropped,
    /// never an error. Stops once `limit` records have been emitted.
    async fn reconcile(&self, candidates: Vec<Candidate>, limit: usize) -> Result<Vec<Agent>> {
        let mut agents: Vec<Agent> = Vec::new();

        for candidate in candidates {
            if agents.len() >= limit {
                break;
            }
            let address = &candidate.entry.address;
            match self.store.get_agent(address).await? {
                Some(agent) => {
                    if agents.iter().any(|a| a.address == agent.address) {
                        continue;
                    }
                    agents.push(agent);
                }
                None => {
                    warn!(
                        %address,
                        "index candidate has no canonical record; dropping (consistency gap)"
                    );
                }
            }
        }

        Ok(agents)
    }
}
