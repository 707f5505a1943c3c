use queue_janitor::store::InMemoryStore;

/// Factory for seeding BullMQ-style queue data
pub struct Factory<'a> {
    store: &'a InMemoryStore,
    prefix: String,
}

#[allow(dead_code)]
impl<'a> Factory<'a> {
    pub fn new(store: &'a InMemoryStore) -> Self {
        Self {
            store,
            prefix: "bull".to_string(),
        }
    }

    /// Container key for a queue state, e.g. `bull:thumbnails:failed`
    pub fn container_key(&self, queue: &str, state: &str) -> String {
        format!("{}:{}:{}", self.prefix, queue, state)
    }

    /// Create the data keys a queue system keeps for one job
    pub async fn create_job(&self, queue: &str, job_id: &str) {
        let job_key = format!("{}:{}:{}", self.prefix, queue, job_id);
        self.store
            .set_hash(&job_key, &[("name", queue), ("data", "{\"id\":\"asset\"}")])
            .await;
        self.store
            .push_list(&format!("{}:logs", job_key), &["started"])
            .await;
    }

    /// Jobs referenced from a list container (wait, active, paused, ...)
    pub async fn list_container(&self, queue: &str, state: &str, job_ids: &[&str]) -> String {
        let key = self.container_key(queue, state);
        self.store.push_list(&key, job_ids).await;
        for job_id in job_ids {
            self.create_job(queue, job_id).await;
        }
        key
    }

    /// Jobs referenced from a set container
    pub async fn set_container(&self, queue: &str, state: &str, job_ids: &[&str]) -> String {
        let key = self.container_key(queue, state);
        self.store.add_set(&key, job_ids).await;
        for job_id in job_ids {
            self.create_job(queue, job_id).await;
        }
        key
    }

    /// Jobs referenced from a sorted-set container (failed, delayed, ...)
    pub async fn sorted_container(&self, queue: &str, state: &str, job_ids: &[&str]) -> String {
        let key = self.container_key(queue, state);
        let scored: Vec<(f64, &str)> = job_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (i as f64, *id))
            .collect();
        self.store.add_sorted(&key, &scored).await;
        for job_id in job_ids {
            self.create_job(queue, job_id).await;
        }
        key
    }

    /// Every key whose name contains the token
    pub async fn keys_containing(&self, token: &str) -> Vec<String> {
        self.store
            .keys()
            .await
            .into_iter()
            .filter(|k| k.contains(token))
            .collect()
    }
}
