//! In-memory backing store for service tests.
//!
//! One `MemoryStore` implements every repository trait plus object storage,
//! so a test can wire all services to the same data. Timestamps come from a
//! logical clock and are strictly increasing.
#![cfg(test)]

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::api::error;
use crate::modules::{
    conversation::{
        model::{NewConversation, UpdateConversation},
        repository::ConversationRepository,
        schema::{ConversationEntity, ConversationStatus},
    },
    file_upload::{
        model::NewFile, repository::FileRepository, schema::FileEntity, storage::ObjectStorage,
    },
    inquiry::{
        model::NewSubmission,
        repository::SubmissionRepository,
        schema::{SubmissionEntity, SubmissionKind, SubmissionStatus},
    },
    invoice::{
        model::{NewInvoice, UpdateInvoice},
        repository::InvoiceRepository,
        schema::{InvoiceEntity, InvoiceStatus},
    },
    message::{model::InsertMessage, repository::MessageRepository, schema::MessageEntity},
    notification::repository::NotificationRepository,
    policy::Principal,
    profile::{
        model::{InsertProfile, UpdateProfile},
        repository::ProfileRepository,
        schema::{ProfileEntity, UserRole},
    },
};

#[derive(Default)]
struct Tables {
    clock: i64,
    profiles: Vec<ProfileEntity>,
    conversations: Vec<ConversationEntity>,
    messages: Vec<MessageEntity>,
    files: Vec<FileEntity>,
    objects: HashMap<String, Vec<u8>>,
    invoices: Vec<InvoiceEntity>,
    inquiries: Vec<SubmissionEntity>,
    ideas: Vec<SubmissionEntity>,
}

impl Tables {
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        DateTime::from_timestamp(1_700_000_000 + self.clock, 0).unwrap()
    }

    fn submissions(&mut self, kind: SubmissionKind) -> &mut Vec<SubmissionEntity> {
        match kind {
            SubmissionKind::Inquiry => &mut self.inquiries,
            SubmissionKind::Idea => &mut self.ideas,
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn add_profile(&self, role: UserRole) -> Uuid {
        let mut t = self.lock();
        let now = t.tick();
        let id = Uuid::now_v7();
        t.profiles.push(ProfileEntity {
            id,
            email: format!("{}@example.com", id.simple()),
            hash_password: String::new(),
            full_name: format!("{role:?} user"),
            company: None,
            phone: None,
            avatar_url: None,
            role,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn add_conversation(&self, client_id: Uuid, admin_id: Option<Uuid>) -> Uuid {
        let mut t = self.lock();
        let now = t.tick();
        let id = Uuid::now_v7();
        t.conversations.push(ConversationEntity {
            id,
            client_id,
            admin_id,
            subject: "Seeded".into(),
            status: ConversationStatus::Open,
            last_activity_at: now,
            created_at: now,
            updated_at: now,
        });
        id
    }

    /// An unread message addressed to `recipient_id` outside any tracked conversation.
    pub fn add_unread_message(&self, recipient_id: Uuid) {
        let mut t = self.lock();
        let now = t.tick();
        t.messages.push(MessageEntity {
            id: Uuid::now_v7(),
            conversation_id: Uuid::now_v7(),
            sender_id: Uuid::now_v7(),
            recipient_id: Some(recipient_id),
            content: "seeded".into(),
            attachments: Vec::new(),
            is_read: false,
            created_at: now,
        });
    }

    pub fn add_submission(&self, kind: SubmissionKind, status: SubmissionStatus) -> Uuid {
        let mut t = self.lock();
        let now = t.tick();
        let id = Uuid::now_v7();
        t.submissions(kind).push(SubmissionEntity {
            id,
            name: "Visitor".into(),
            email: "visitor@example.com".into(),
            company: None,
            message: "seeded".into(),
            submitted_by: None,
            status,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn message_count(&self) -> usize {
        self.lock().messages.len()
    }

    pub fn object_count(&self) -> usize {
        self.lock().objects.len()
    }
}

/// The principal the extractor would build for `id`.
pub fn principal_for(store: &MemoryStore, id: Uuid) -> Principal {
    let t = store.lock();
    let profile = t.profiles.iter().find(|p| p.id == id);
    Principal {
        id,
        email: profile.map(|p| p.email.clone()).unwrap_or_default(),
        role: profile.map(|p| p.role),
    }
}

#[async_trait::async_trait]
impl ProfileRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ProfileEntity>, error::SystemError> {
        Ok(self.lock().profiles.iter().find(|p| p.id == *id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<ProfileEntity>, error::SystemError> {
        Ok(self.lock().profiles.iter().find(|p| p.email == email).cloned())
    }

    async fn find_by_role(&self, role: &UserRole) -> Result<Vec<ProfileEntity>, error::SystemError> {
        Ok(self.lock().profiles.iter().filter(|p| p.role == *role).cloned().collect())
    }

    async fn create(&self, profile: &InsertProfile) -> Result<Uuid, error::SystemError> {
        let mut t = self.lock();
        if t.profiles.iter().any(|p| p.email == profile.email) {
            return Err(error::SystemError::Conflict(None));
        }
        let now = t.tick();
        t.profiles.push(ProfileEntity {
            id: profile.id,
            email: profile.email.clone(),
            hash_password: profile.hash_password.clone(),
            full_name: profile.full_name.clone(),
            company: profile.company.clone(),
            phone: None,
            avatar_url: None,
            role: profile.role,
            created_at: now,
            updated_at: now,
        });
        Ok(profile.id)
    }

    async fn update(
        &self,
        id: &Uuid,
        changes: &UpdateProfile,
    ) -> Result<Option<ProfileEntity>, error::SystemError> {
        let mut t = self.lock();
        let now = t.tick();
        let Some(p) = t.profiles.iter_mut().find(|p| p.id == *id) else {
            return Ok(None);
        };
        if let Some(full_name) = &changes.full_name {
            p.full_name = full_name.clone();
        }
        if let Some(company) = &changes.company {
            p.company = company.clone();
        }
        if let Some(phone) = &changes.phone {
            p.phone = phone.clone();
        }
        if let Some(avatar_url) = &changes.avatar_url {
            p.avatar_url = avatar_url.clone();
        }
        if let Some(role) = changes.role {
            p.role = role;
        }
        p.updated_at = now;
        Ok(Some(p.clone()))
    }
}

#[async_trait::async_trait]
impl ConversationRepository for MemoryStore {
    async fn find_by_id(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        Ok(self.lock().conversations.iter().find(|c| c.id == *conversation_id).cloned())
    }

    async fn find_all(
        &self,
        client_id: Option<&Uuid>,
        status: Option<&ConversationStatus>,
    ) -> Result<Vec<ConversationEntity>, error::SystemError> {
        let mut list: Vec<ConversationEntity> = self
            .lock()
            .conversations
            .iter()
            .filter(|c| client_id.is_none_or(|id| c.client_id == *id))
            .filter(|c| status.is_none_or(|s| c.status == *s))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.last_activity_at.cmp(&a.last_activity_at));
        Ok(list)
    }

    async fn create(
        &self,
        conversation: &NewConversation,
    ) -> Result<ConversationEntity, error::SystemError> {
        let mut t = self.lock();
        let now = t.tick();
        let entity = ConversationEntity {
            id: conversation.id,
            client_id: conversation.client_id,
            admin_id: None,
            subject: conversation.subject.clone(),
            status: ConversationStatus::Open,
            last_activity_at: now,
            created_at: now,
            updated_at: now,
        };
        t.conversations.push(entity.clone());
        Ok(entity)
    }

    async fn update(
        &self,
        conversation_id: &Uuid,
        changes: &UpdateConversation,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        let mut t = self.lock();
        let now = t.tick();
        let Some(c) = t.conversations.iter_mut().find(|c| c.id == *conversation_id) else {
            return Ok(None);
        };
        if let Some(subject) = &changes.subject {
            c.subject = subject.clone();
        }
        if let Some(status) = changes.status {
            c.status = status;
        }
        if let Some(admin_id) = changes.admin_id {
            c.admin_id = admin_id;
        }
        c.updated_at = now;
        Ok(Some(c.clone()))
    }
}

#[async_trait::async_trait]
impl MessageRepository for MemoryStore {
    async fn create(&self, message: &InsertMessage) -> Result<MessageEntity, error::SystemError> {
        let mut t = self.lock();
        let now = t.tick();
        let Some(conversation) = t.conversations.iter_mut().find(|c| c.id == message.conversation_id)
        else {
            return Err(error::SystemError::not_found("Conversation not found"));
        };
        conversation.last_activity_at = now;

        let entity = MessageEntity {
            id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            content: message.content.clone(),
            attachments: message.attachments.clone(),
            is_read: false,
            created_at: now,
        };
        t.messages.push(entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, message_id: &Uuid) -> Result<Option<MessageEntity>, error::SystemError> {
        Ok(self.lock().messages.iter().find(|m| m.id == *message_id).cloned())
    }

    async fn find_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let mut list: Vec<MessageEntity> = self
            .lock()
            .messages
            .iter()
            .filter(|m| m.conversation_id == *conversation_id)
            .cloned()
            .collect();
        list.sort_by_key(|m| m.created_at);
        Ok(list)
    }

    async fn mark_read(
        &self,
        message_id: &Uuid,
        recipient_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let mut t = self.lock();
        let found = t
            .messages
            .iter_mut()
            .find(|m| m.id == *message_id && m.recipient_id == Some(*recipient_id));
        Ok(found.map(|m| {
            m.is_read = true;
            m.clone()
        }))
    }

    async fn mark_conversation_read(
        &self,
        conversation_id: &Uuid,
        recipient_id: &Uuid,
    ) -> Result<u64, error::SystemError> {
        let mut t = self.lock();
        let mut flipped = 0;
        for m in t.messages.iter_mut().filter(|m| {
            m.conversation_id == *conversation_id
                && m.recipient_id == Some(*recipient_id)
                && !m.is_read
        }) {
            m.is_read = true;
            flipped += 1;
        }
        Ok(flipped)
    }
}

#[async_trait::async_trait]
impl NotificationRepository for MemoryStore {
    async fn count_unread_messages(&self, recipient_id: &Uuid) -> Result<i64, error::SystemError> {
        let t = self.lock();
        let count = t
            .messages
            .iter()
            .filter(|m| m.recipient_id == Some(*recipient_id) && !m.is_read)
            .count();
        Ok(count as i64)
    }

    async fn count_pending_submissions(&self) -> Result<(i64, i64), error::SystemError> {
        let t = self.lock();
        let pending = |list: &[SubmissionEntity]| {
            list.iter().filter(|s| s.status == SubmissionStatus::New).count() as i64
        };
        Ok((pending(&t.inquiries), pending(&t.ideas)))
    }
}

#[async_trait::async_trait]
impl FileRepository for MemoryStore {
    async fn create(&self, file: &NewFile) -> Result<FileEntity, error::SystemError> {
        let mut t = self.lock();
        let now = t.tick();
        let entity = FileEntity {
            id: file.id,
            owner_id: file.owner_id,
            conversation_id: file.conversation_id,
            original_filename: file.original_filename.clone(),
            mime_type: file.mime_type.clone(),
            file_size: file.file_size,
            storage_path: file.storage_path.clone(),
            created_at: now,
        };
        t.files.push(entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, file_id: &Uuid) -> Result<Option<FileEntity>, error::SystemError> {
        Ok(self.lock().files.iter().find(|f| f.id == *file_id).cloned())
    }

    async fn delete(&self, file_id: &Uuid) -> Result<bool, error::SystemError> {
        let mut t = self.lock();
        let before = t.files.len();
        t.files.retain(|f| f.id != *file_id);
        Ok(t.files.len() < before)
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MemoryStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), error::SystemError> {
        self.lock().objects.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, error::SystemError> {
        Ok(self.lock().objects.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), error::SystemError> {
        self.lock().objects.remove(key);
        Ok(())
    }
}

#[async_trait::async_trait]
impl InvoiceRepository for MemoryStore {
    async fn find_by_id(&self, invoice_id: &Uuid) -> Result<Option<InvoiceEntity>, error::SystemError> {
        Ok(self.lock().invoices.iter().find(|i| i.id == *invoice_id).cloned())
    }

    async fn find_all(
        &self,
        client_id: Option<&Uuid>,
        status: Option<&InvoiceStatus>,
        include_drafts: bool,
    ) -> Result<Vec<InvoiceEntity>, error::SystemError> {
        let mut list: Vec<InvoiceEntity> = self
            .lock()
            .invoices
            .iter()
            .filter(|i| client_id.is_none_or(|id| i.client_id == *id))
            .filter(|i| status.is_none_or(|s| i.status == *s))
            .filter(|i| include_drafts || i.status != InvoiceStatus::Draft)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn create(&self, invoice: &NewInvoice) -> Result<InvoiceEntity, error::SystemError> {
        let mut t = self.lock();
        if t.invoices.iter().any(|i| i.number == invoice.number) {
            return Err(error::SystemError::Conflict(None));
        }
        let now = t.tick();
        let entity = InvoiceEntity {
            id: invoice.id,
            client_id: invoice.client_id,
            project_name: invoice.project_name.clone(),
            number: invoice.number.clone(),
            amount_cents: invoice.amount_cents,
            currency: invoice.currency.clone(),
            status: InvoiceStatus::Draft,
            due_date: invoice.due_date,
            created_at: now,
            updated_at: now,
        };
        t.invoices.push(entity.clone());
        Ok(entity)
    }

    async fn update(
        &self,
        invoice_id: &Uuid,
        changes: &UpdateInvoice,
    ) -> Result<Option<InvoiceEntity>, error::SystemError> {
        let mut t = self.lock();
        let now = t.tick();
        let Some(i) = t.invoices.iter_mut().find(|i| i.id == *invoice_id) else {
            return Ok(None);
        };
        if let Some(status) = changes.status {
            i.status = status;
        }
        if let Some(project_name) = &changes.project_name {
            i.project_name = Some(project_name.clone());
        }
        if let Some(due_date) = changes.due_date {
            i.due_date = due_date;
        }
        i.updated_at = now;
        Ok(Some(i.clone()))
    }
}

#[async_trait::async_trait]
impl SubmissionRepository for MemoryStore {
    async fn create(
        &self,
        kind: SubmissionKind,
        submission: &NewSubmission,
    ) -> Result<SubmissionEntity, error::SystemError> {
        let mut t = self.lock();
        let now = t.tick();
        let entity = SubmissionEntity {
            id: submission.id,
            name: submission.name.clone(),
            email: submission.email.clone(),
            company: submission.company.clone(),
            message: submission.message.clone(),
            submitted_by: submission.submitted_by,
            status: SubmissionStatus::New,
            created_at: now,
            updated_at: now,
        };
        t.submissions(kind).push(entity.clone());
        Ok(entity)
    }

    async fn find_by_id(
        &self,
        kind: SubmissionKind,
        id: &Uuid,
    ) -> Result<Option<SubmissionEntity>, error::SystemError> {
        Ok(self.lock().submissions(kind).iter().find(|s| s.id == *id).cloned())
    }

    async fn find_all(
        &self,
        kind: SubmissionKind,
        status: Option<&SubmissionStatus>,
    ) -> Result<Vec<SubmissionEntity>, error::SystemError> {
        let mut t = self.lock();
        let mut list: Vec<SubmissionEntity> = t
            .submissions(kind)
            .iter()
            .filter(|s| status.is_none_or(|st| s.status == *st))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn update_status(
        &self,
        kind: SubmissionKind,
        id: &Uuid,
        status: SubmissionStatus,
    ) -> Result<Option<SubmissionEntity>, error::SystemError> {
        let mut t = self.lock();
        let now = t.tick();
        let Some(s) = t.submissions(kind).iter_mut().find(|s| s.id == *id) else {
            return Ok(None);
        };
        s.status = status;
        s.updated_at = now;
        Ok(Some(s.clone()))
    }
}
