use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use uuid::Uuid;

use crate::attendance::presenca::Presenca;
use crate::council::types::{Camara, Vereador};
use crate::error_handling::types::StorageError;
use crate::session_management::{Sessao, SessaoChanges, SessaoStatus};
use crate::storage::storage_trait::Storage;
use crate::storage::types::{GuardedInsert, ProjetoFilter, SessaoFilter};
use crate::voting::types::{Projeto, ProjetoStatus, Voto};

#[derive(Default)]
struct Tables {
    camaras: HashMap<Uuid, Camara>,
    vereadores: HashMap<Uuid, Vereador>,
    sessoes: HashMap<Uuid, Sessao>,
    presencas: HashMap<(Uuid, Uuid), Presenca>,
    projetos: HashMap<Uuid, Projeto>,
    votos: HashMap<(Uuid, Uuid), Voto>,
}

impl Tables {
    fn remove_sessao_cascade(&mut self, id: Uuid) {
        self.sessoes.remove(&id);
        self.presencas.retain(|(sessao_id, _), _| *sessao_id != id);
        let projetos: Vec<Uuid> = self
            .projetos
            .values()
            .filter(|p| p.sessao_id == Some(id))
            .map(|p| p.id)
            .collect();
        for projeto_id in projetos {
            self.remove_projeto_cascade(projeto_id);
        }
    }

    fn remove_projeto_cascade(&mut self, id: Uuid) {
        self.projetos.remove(&id);
        self.votos.retain(|(projeto_id, _), _| *projeto_id != id);
    }

    fn sessao_admits(&self, id: Uuid, guard: &[SessaoStatus]) -> bool {
        self.sessoes
            .get(&id)
            .map_or(false, |s| guard.contains(&s.status))
    }
}

/// Process-local storage backend.
///
/// Every table lives behind a single lock, so each trait method is atomic
/// with respect to the others. Contents are lost when the process exits.
pub struct MemoryStorage {
    tables: Mutex<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        info!("MemoryStorage initialized");
        Self {
            tables: Mutex::new(Tables::default()),
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        self.tables.lock().map_err(|_| {
            error!("MemoryStorage lock poisoned");
            StorageError::Unavailable
        })
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save_camara(&self, camara: &Camara) -> Result<(), StorageError> {
        let mut t = self.tables()?;
        if t.camaras.contains_key(&camara.id) {
            return Err(StorageError::UniqueViolation);
        }
        t.camaras.insert(camara.id, camara.clone());
        Ok(())
    }

    async fn get_camara(&self, id: Uuid) -> Result<Option<Camara>, StorageError> {
        Ok(self.tables()?.camaras.get(&id).cloned())
    }

    async fn delete_camara(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut t = self.tables()?;
        if t.camaras.remove(&id).is_none() {
            return Ok(false);
        }
        let sessoes: Vec<Uuid> = t
            .sessoes
            .values()
            .filter(|s| s.camara_id == id)
            .map(|s| s.id)
            .collect();
        for sessao_id in sessoes {
            t.remove_sessao_cascade(sessao_id);
        }
        let projetos: Vec<Uuid> = t
            .projetos
            .values()
            .filter(|p| p.camara_id == id)
            .map(|p| p.id)
            .collect();
        for projeto_id in projetos {
            t.remove_projeto_cascade(projeto_id);
        }
        let vereadores: Vec<Uuid> = t
            .vereadores
            .values()
            .filter(|v| v.camara_id == id)
            .map(|v| v.id)
            .collect();
        for vereador_id in &vereadores {
            t.vereadores.remove(vereador_id);
        }
        t.presencas.retain(|(_, v), _| !vereadores.contains(v));
        t.votos.retain(|(_, v), _| !vereadores.contains(v));
        debug!("Removed camara {} with {} vereador(es)", id, vereadores.len());
        Ok(true)
    }

    async fn save_vereador(&self, vereador: &Vereador) -> Result<(), StorageError> {
        let mut t = self.tables()?;
        if !t.camaras.contains_key(&vereador.camara_id) {
            return Err(StorageError::ForeignKeyViolation);
        }
        if t.vereadores.contains_key(&vereador.id) {
            return Err(StorageError::UniqueViolation);
        }
        t.vereadores.insert(vereador.id, vereador.clone());
        Ok(())
    }

    async fn get_vereador(&self, id: Uuid) -> Result<Option<Vereador>, StorageError> {
        Ok(self.tables()?.vereadores.get(&id).cloned())
    }

    async fn get_vereadores(&self, camara_id: Uuid) -> Result<Vec<Vereador>, StorageError> {
        let t = self.tables()?;
        let mut out: Vec<Vereador> = t
            .vereadores
            .values()
            .filter(|v| v.camara_id == camara_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.nome.cmp(&b.nome));
        Ok(out)
    }

    async fn save_sessao(&self, sessao: &Sessao) -> Result<(), StorageError> {
        let mut t = self.tables()?;
        if !t.camaras.contains_key(&sessao.camara_id) {
            return Err(StorageError::ForeignKeyViolation);
        }
        if t.sessoes.contains_key(&sessao.id) {
            return Err(StorageError::UniqueViolation);
        }
        t.sessoes.insert(sessao.id, sessao.clone());
        Ok(())
    }

    async fn get_sessao(&self, id: Uuid) -> Result<Option<Sessao>, StorageError> {
        Ok(self.tables()?.sessoes.get(&id).cloned())
    }

    async fn get_sessoes(&self, filter: Option<SessaoFilter>) -> Result<Vec<Sessao>, StorageError> {
        let t = self.tables()?;
        let mut out: Vec<Sessao> = t
            .sessoes
            .values()
            .filter(|s| filter.as_ref().map_or(true, |f| f.matches(s)))
            .cloned()
            .collect();
        out.sort_by_key(|s| s.data);
        Ok(out)
    }

    async fn update_sessao(
        &self,
        id: Uuid,
        changes: &SessaoChanges,
        guard: &[SessaoStatus],
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let mut t = self.tables()?;
        match t.sessoes.get_mut(&id) {
            Some(sessao) if guard.contains(&sessao.status) => {
                changes.apply_to(sessao, at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn transition_sessao(
        &self,
        id: Uuid,
        from: &[SessaoStatus],
        to: SessaoStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let mut t = self.tables()?;
        match t.sessoes.get_mut(&id) {
            Some(sessao) if from.contains(&sessao.status) => {
                sessao.status = to;
                sessao.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_sessao(&self, id: Uuid, guard: &[SessaoStatus]) -> Result<bool, StorageError> {
        let mut t = self.tables()?;
        let deletable = t.sessoes.get(&id).map_or(false, |s| guard.contains(&s.status));
        if deletable {
            t.remove_sessao_cascade(id);
        }
        Ok(deletable)
    }

    async fn upsert_presenca(
        &self,
        presenca: &Presenca,
        guard: &[SessaoStatus],
    ) -> Result<bool, StorageError> {
        let mut t = self.tables()?;
        if !t.sessao_admits(presenca.sessao_id, guard) {
            return Ok(false);
        }
        if !t.vereadores.contains_key(&presenca.vereador_id) {
            return Err(StorageError::ForeignKeyViolation);
        }
        t.presencas
            .insert((presenca.sessao_id, presenca.vereador_id), presenca.clone());
        Ok(true)
    }

    async fn insert_presenca_if_absent(
        &self,
        presenca: &Presenca,
        guard: &[SessaoStatus],
    ) -> Result<GuardedInsert, StorageError> {
        let mut t = self.tables()?;
        if !t.sessao_admits(presenca.sessao_id, guard) {
            return Ok(GuardedInsert::Refused);
        }
        if !t.vereadores.contains_key(&presenca.vereador_id) {
            return Err(StorageError::ForeignKeyViolation);
        }
        let key = (presenca.sessao_id, presenca.vereador_id);
        if t.presencas.contains_key(&key) {
            return Ok(GuardedInsert::Existing);
        }
        t.presencas.insert(key, presenca.clone());
        Ok(GuardedInsert::Inserted)
    }

    async fn get_presencas(&self, sessao_id: Uuid) -> Result<Vec<Presenca>, StorageError> {
        let t = self.tables()?;
        Ok(t.presencas.values().filter(|p| p.sessao_id == sessao_id).cloned().collect())
    }

    async fn save_projeto(&self, projeto: &Projeto) -> Result<(), StorageError> {
        let mut t = self.tables()?;
        if !t.camaras.contains_key(&projeto.camara_id) {
            return Err(StorageError::ForeignKeyViolation);
        }
        if let Some(sessao_id) = projeto.sessao_id {
            if !t.sessoes.contains_key(&sessao_id) {
                return Err(StorageError::ForeignKeyViolation);
            }
        }
        if t.projetos.contains_key(&projeto.id) {
            return Err(StorageError::UniqueViolation);
        }
        t.projetos.insert(projeto.id, projeto.clone());
        Ok(())
    }

    async fn get_projeto(&self, id: Uuid) -> Result<Option<Projeto>, StorageError> {
        Ok(self.tables()?.projetos.get(&id).cloned())
    }

    async fn get_projetos(
        &self,
        filter: Option<ProjetoFilter>,
    ) -> Result<Vec<Projeto>, StorageError> {
        let t = self.tables()?;
        let mut out: Vec<Projeto> = t
            .projetos
            .values()
            .filter(|p| filter.as_ref().map_or(true, |f| f.matches(p)))
            .cloned()
            .collect();
        out.sort_by_key(|p| p.data_apresentacao);
        Ok(out)
    }

    async fn transition_projeto(
        &self,
        id: Uuid,
        from: &[ProjetoStatus],
        to: ProjetoStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let mut t = self.tables()?;
        match t.projetos.get_mut(&id) {
            Some(projeto) if from.contains(&projeto.status) => {
                projeto.status = to;
                projeto.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn save_voto(&self, voto: &Voto, guard: &[ProjetoStatus]) -> Result<bool, StorageError> {
        let mut t = self.tables()?;
        let open = t
            .projetos
            .get(&voto.projeto_id)
            .map_or(false, |p| guard.contains(&p.status));
        if !open {
            return Ok(false);
        }
        if !t.vereadores.contains_key(&voto.vereador_id) {
            return Err(StorageError::ForeignKeyViolation);
        }
        let key = (voto.projeto_id, voto.vereador_id);
        if t.votos.contains_key(&key) {
            return Err(StorageError::UniqueViolation);
        }
        t.votos.insert(key, voto.clone());
        Ok(true)
    }

    async fn get_voto(
        &self,
        projeto_id: Uuid,
        vereador_id: Uuid,
    ) -> Result<Option<Voto>, StorageError> {
        Ok(self.tables()?.votos.get(&(projeto_id, vereador_id)).cloned())
    }

    async fn get_votos(&self, projeto_id: Uuid) -> Result<Vec<Voto>, StorageError> {
        let t = self.tables()?;
        let mut out: Vec<Voto> = t
            .votos
            .values()
            .filter(|v| v.projeto_id == projeto_id)
            .cloned()
            .collect();
        out.sort_by_key(|v| v.registrado_em);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_management::TipoSessao;
    use crate::storage::timestamp;
    use crate::voting::types::VotoValor;

    fn camara() -> Camara {
        Camara {
            id: Uuid::new_v4(),
            nome: "Câmara de Teste".into(),
            cidade: "Mariana".into(),
            created_at: timestamp(),
        }
    }

    fn sessao(camara_id: Uuid) -> Sessao {
        let now = timestamp();
        Sessao {
            id: Uuid::new_v4(),
            titulo: "Sessão".into(),
            descricao: "Pauta".into(),
            data: now,
            tipo: TipoSessao::Solene,
            status: SessaoStatus::Agendada,
            camara_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_sessao_requires_existing_camara() {
        let storage = MemoryStorage::new();
        let orphan = sessao(Uuid::new_v4());
        assert_eq!(
            storage.save_sessao(&orphan).await,
            Err(StorageError::ForeignKeyViolation)
        );
    }

    #[tokio::test]
    async fn test_filter_and_transition() {
        let storage = MemoryStorage::new();
        let c = camara();
        storage.save_camara(&c).await.unwrap();
        let s = sessao(c.id);
        storage.save_sessao(&s).await.unwrap();
        storage.save_sessao(&sessao(c.id)).await.unwrap();

        assert!(storage
            .transition_sessao(
                s.id,
                &[SessaoStatus::Agendada],
                SessaoStatus::EmAndamento,
                timestamp()
            )
            .await
            .unwrap());
        let em_andamento = storage
            .get_sessoes(Some(SessaoFilter {
                status: Some(SessaoStatus::EmAndamento),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(em_andamento.len(), 1);
        assert_eq!(em_andamento[0].id, s.id);
        assert_eq!(storage.get_sessoes(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_camara_removes_everything_it_owns() {
        let storage = MemoryStorage::new();
        let c = camara();
        storage.save_camara(&c).await.unwrap();
        let vereador = Vereador {
            id: Uuid::new_v4(),
            camara_id: c.id,
            nome: "Ana".into(),
            partido: Some("PV".into()),
            ativo: true,
            created_at: timestamp(),
        };
        storage.save_vereador(&vereador).await.unwrap();
        let s = sessao(c.id);
        storage.save_sessao(&s).await.unwrap();
        let now = timestamp();
        let projeto = Projeto {
            id: Uuid::new_v4(),
            titulo: "PL".into(),
            descricao: "".into(),
            autor: "Ana".into(),
            sessao_id: None,
            camara_id: c.id,
            status: ProjetoStatus::EmVotacao,
            data_apresentacao: now,
            created_at: now,
            updated_at: now,
        };
        storage.save_projeto(&projeto).await.unwrap();
        let voto = Voto {
            projeto_id: projeto.id,
            vereador_id: vereador.id,
            voto: VotoValor::Sim,
            registrado_em: now,
        };
        assert!(storage.save_voto(&voto, &ProjetoStatus::ABERTOS).await.unwrap());

        assert!(storage.delete_camara(c.id).await.unwrap());
        assert!(storage.get_vereador(vereador.id).await.unwrap().is_none());
        assert!(storage.get_sessao(s.id).await.unwrap().is_none());
        assert!(storage.get_projeto(projeto.id).await.unwrap().is_none());
        assert!(storage.get_votos(projeto.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_parents_refuse_writes() {
        let storage = MemoryStorage::new();
        let c = camara();
        storage.save_camara(&c).await.unwrap();
        let vereador = Vereador {
            id: Uuid::new_v4(),
            camara_id: c.id,
            nome: "Bia".into(),
            partido: None,
            ativo: true,
            created_at: timestamp(),
        };
        storage.save_vereador(&vereador).await.unwrap();
        let s = sessao(c.id);
        storage.save_sessao(&s).await.unwrap();
        storage
            .transition_sessao(
                s.id,
                &[SessaoStatus::Agendada],
                SessaoStatus::Finalizada,
                timestamp(),
            )
            .await
            .unwrap();

        let presenca = Presenca {
            sessao_id: s.id,
            vereador_id: vereador.id,
            presente: false,
            registrado_em: timestamp(),
        };
        let guard = SessaoStatus::NAO_TERMINAIS;
        assert!(!storage.upsert_presenca(&presenca, &guard).await.unwrap());
        assert_eq!(
            storage.insert_presenca_if_absent(&presenca, &guard).await,
            Ok(GuardedInsert::Refused)
        );
        assert!(storage.get_presencas(s.id).await.unwrap().is_empty());

        let now = timestamp();
        let projeto = Projeto {
            id: Uuid::new_v4(),
            titulo: "PL".into(),
            descricao: "".into(),
            autor: "Bia".into(),
            sessao_id: None,
            camara_id: c.id,
            status: ProjetoStatus::Aprovado,
            data_apresentacao: now,
            created_at: now,
            updated_at: now,
        };
        storage.save_projeto(&projeto).await.unwrap();
        let voto = Voto {
            projeto_id: projeto.id,
            vereador_id: vereador.id,
            voto: VotoValor::Nao,
            registrado_em: now,
        };
        assert!(!storage.save_voto(&voto, &ProjetoStatus::ABERTOS).await.unwrap());
        assert!(storage.get_votos(projeto.id).await.unwrap().is_empty());
    }
}
