use std::sync::Arc;

use log::{debug, info};
use uuid::Uuid;

use crate::council::types::{Camara, NovaCamara, NovoVereador, Vereador};
use crate::error_handling::types::WorkflowError;
use crate::storage::{timestamp, Storage};

/// Registry of câmaras and their vereadores.
#[derive(Clone)]
pub struct CouncilDirectory {
    storage: Arc<dyn Storage>,
}

impl CouncilDirectory {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn create_camara(&self, nova: NovaCamara) -> Result<Camara, WorkflowError> {
        let nome = nova.nome.trim();
        if nome.is_empty() {
            return Err(WorkflowError::Validation("nome must not be blank".into()));
        }
        let camara = Camara {
            id: Uuid::new_v4(),
            nome: nome.to_string(),
            cidade: nova.cidade.trim().to_string(),
            created_at: timestamp(),
        };
        self.storage.save_camara(&camara).await?;
        info!("Camara {} created ({})", camara.id, camara.nome);
        Ok(camara)
    }

    pub async fn get_camara(&self, id: Uuid) -> Result<Camara, WorkflowError> {
        self.storage
            .get_camara(id)
            .await?
            .ok_or(WorkflowError::NotFound { entity: "camara", id })
    }

    pub async fn delete_camara(&self, id: Uuid) -> Result<(), WorkflowError> {
        if !self.storage.delete_camara(id).await? {
            return Err(WorkflowError::NotFound { entity: "camara", id });
        }
        info!("Camara {} deleted", id);
        Ok(())
    }

    pub async fn add_vereador(
        &self,
        camara_id: Uuid,
        novo: NovoVereador,
    ) -> Result<Vereador, WorkflowError> {
        let nome = novo.nome.trim();
        if nome.is_empty() {
            return Err(WorkflowError::Validation("nome must not be blank".into()));
        }
        self.get_camara(camara_id).await?;

        let vereador = Vereador {
            id: Uuid::new_v4(),
            camara_id,
            nome: nome.to_string(),
            partido: novo.partido.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
            ativo: novo.ativo,
            created_at: timestamp(),
        };
        self.storage.save_vereador(&vereador).await?;
        debug!("Vereador {} added to camara {}", vereador.id, camara_id);
        Ok(vereador)
    }

    pub async fn list_vereadores(&self, camara_id: Uuid) -> Result<Vec<Vereador>, WorkflowError> {
        self.get_camara(camara_id).await?;
        Ok(self.storage.get_vereadores(camara_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use tokio_test::{assert_err, assert_ok};

    fn directory() -> CouncilDirectory {
        CouncilDirectory::new(Arc::new(MemoryStorage::new()))
    }

    fn nova(nome: &str, cidade: &str) -> NovaCamara {
        NovaCamara {
            nome: nome.into(),
            cidade: cidade.into(),
        }
    }

    fn vereador(nome: &str) -> NovoVereador {
        NovoVereador {
            nome: nome.into(),
            partido: Some(" PT ".into()),
            ativo: true,
        }
    }

    #[tokio::test]
    async fn test_create_camara_rejects_blank_name() {
        let dir = directory();
        let err = assert_err!(
            dir.create_camara(NovaCamara {
                nome: "   ".into(),
                cidade: "Ouro Preto".into(),
            })
            .await
        );
        assert_eq!(err.kind(), "validation");
    }

    #[tokio::test]
    async fn test_vereadores_are_listed_per_camara() {
        let dir = directory();
        let a = assert_ok!(dir.create_camara(nova("A", "X")).await);
        let b = assert_ok!(dir.create_camara(nova("B", "Y")).await);

        let carla = assert_ok!(dir.add_vereador(a.id, vereador("Carla")).await);
        assert_eq!(carla.partido.as_deref(), Some("PT"));
        assert_ok!(dir.add_vereador(a.id, vereador("Bruno")).await);
        assert_ok!(dir.add_vereador(b.id, vereador("Davi")).await);

        let nomes: Vec<String> = assert_ok!(dir.list_vereadores(a.id).await)
            .into_iter()
            .map(|v| v.nome)
            .collect();
        assert_eq!(nomes, vec!["Bruno".to_string(), "Carla".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_camara_is_not_found() {
        let dir = directory();
        let missing = Uuid::new_v4();
        let err = assert_err!(dir.add_vereador(missing, vereador("Eva")).await);
        assert!(matches!(err, WorkflowError::NotFound { entity: "camara", .. }));
        assert_err!(dir.list_vereadores(missing).await);
        assert_err!(dir.delete_camara(missing).await);
    }

    #[tokio::test]
    async fn test_delete_camara() {
        let dir = directory();
        let camara = assert_ok!(dir.create_camara(nova("A", "X")).await);
        assert_ok!(dir.delete_camara(camara.id).await);
        assert_err!(dir.get_camara(camara.id).await);
    }
}
