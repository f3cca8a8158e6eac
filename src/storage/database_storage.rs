use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, error, info};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::attendance::presenca::Presenca;
use crate::council::types::{Camara, Vereador};
use crate::error_handling::types::StorageError;
use crate::session_management::{Sessao, SessaoChanges, SessaoStatus};
use crate::storage::db_entities::{camaras, presencas, projetos, sessoes, vereadores, votos};
use crate::storage::storage_trait::Storage;
use crate::storage::types::{GuardedInsert, ProjetoFilter, SessaoFilter};
use crate::voting::types::{Projeto, ProjetoStatus, Voto};

const SCHEMA: [&str; 6] = [
    "CREATE TABLE IF NOT EXISTS camaras (
        id TEXT PRIMARY KEY,
        nome TEXT NOT NULL,
        cidade TEXT NOT NULL,
        created_at TEXT NOT NULL
    );",
    "CREATE TABLE IF NOT EXISTS vereadores (
        id TEXT PRIMARY KEY,
        camara_id TEXT NOT NULL,
        nome TEXT NOT NULL,
        partido TEXT,
        ativo INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        FOREIGN KEY(camara_id) REFERENCES camaras(id) ON DELETE CASCADE
    );",
    "CREATE TABLE IF NOT EXISTS sessoes (
        id TEXT PRIMARY KEY,
        titulo TEXT NOT NULL,
        descricao TEXT NOT NULL,
        data TEXT NOT NULL,
        tipo TEXT NOT NULL,
        status TEXT NOT NULL,
        camara_id TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(camara_id) REFERENCES camaras(id) ON DELETE CASCADE
    );",
    "CREATE TABLE IF NOT EXISTS presencas (
        sessao_id TEXT NOT NULL,
        vereador_id TEXT NOT NULL,
        presente INTEGER NOT NULL,
        registrado_em TEXT NOT NULL,
        PRIMARY KEY (sessao_id, vereador_id),
        FOREIGN KEY(sessao_id) REFERENCES sessoes(id) ON DELETE CASCADE,
        FOREIGN KEY(vereador_id) REFERENCES vereadores(id) ON DELETE CASCADE
    );",
    "CREATE TABLE IF NOT EXISTS projetos (
        id TEXT PRIMARY KEY,
        titulo TEXT NOT NULL,
        descricao TEXT NOT NULL,
        autor TEXT NOT NULL,
        sessao_id TEXT,
        camara_id TEXT NOT NULL,
        status TEXT NOT NULL,
        data_apresentacao TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(camara_id) REFERENCES camaras(id) ON DELETE CASCADE,
        FOREIGN KEY(sessao_id) REFERENCES sessoes(id) ON DELETE CASCADE
    );",
    "CREATE TABLE IF NOT EXISTS votos (
        projeto_id TEXT NOT NULL,
        vereador_id TEXT NOT NULL,
        voto TEXT NOT NULL,
        registrado_em TEXT NOT NULL,
        PRIMARY KEY (projeto_id, vereador_id),
        FOREIGN KEY(projeto_id) REFERENCES projetos(id) ON DELETE CASCADE,
        FOREIGN KEY(vereador_id) REFERENCES vereadores(id) ON DELETE CASCADE
    );",
];

fn fmt_time(t: DateTime<Utc>) -> String {
    // Fixed precision keeps lexicographic order equal to chronological order.
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupted(format!("invalid timestamp '{}': {}", s, e)))
}

fn parse_uuid(s: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(s).map_err(|e| StorageError::Corrupted(format!("invalid uuid '{}': {}", s, e)))
}

fn parse_label<T: FromStr<Err = String>>(s: &str) -> Result<T, StorageError> {
    s.parse::<T>().map_err(StorageError::Corrupted)
}

fn read_error(err: DbErr) -> StorageError {
    error!("Storage read failed: {}", err);
    StorageError::ReadFailed(err.to_string())
}

fn write_error(err: DbErr) -> StorageError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StorageError::UniqueViolation,
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => StorageError::ForeignKeyViolation,
        _ => {
            error!("Storage write failed: {}", err);
            StorageError::WriteFailed(err.to_string())
        }
    }
}

fn into_camara(m: camaras::Model) -> Result<Camara, StorageError> {
    Ok(Camara {
        id: parse_uuid(&m.id)?,
        nome: m.nome,
        cidade: m.cidade,
        created_at: parse_time(&m.created_at)?,
    })
}

fn into_vereador(m: vereadores::Model) -> Result<Vereador, StorageError> {
    Ok(Vereador {
        id: parse_uuid(&m.id)?,
        camara_id: parse_uuid(&m.camara_id)?,
        nome: m.nome,
        partido: m.partido,
        ativo: m.ativo,
        created_at: parse_time(&m.created_at)?,
    })
}

fn into_sessao(m: sessoes::Model) -> Result<Sessao, StorageError> {
    Ok(Sessao {
        id: parse_uuid(&m.id)?,
        titulo: m.titulo,
        descricao: m.descricao,
        data: parse_time(&m.data)?,
        tipo: parse_label(&m.tipo)?,
        status: parse_label(&m.status)?,
        camara_id: parse_uuid(&m.camara_id)?,
        created_at: parse_time(&m.created_at)?,
        updated_at: parse_time(&m.updated_at)?,
    })
}

fn into_presenca(m: presencas::Model) -> Result<Presenca, StorageError> {
    Ok(Presenca {
        sessao_id: parse_uuid(&m.sessao_id)?,
        vereador_id: parse_uuid(&m.vereador_id)?,
        presente: m.presente,
        registrado_em: parse_time(&m.registrado_em)?,
    })
}

fn into_projeto(m: projetos::Model) -> Result<Projeto, StorageError> {
    Ok(Projeto {
        id: parse_uuid(&m.id)?,
        titulo: m.titulo,
        descricao: m.descricao,
        autor: m.autor,
        sessao_id: m.sessao_id.as_deref().map(parse_uuid).transpose()?,
        camara_id: parse_uuid(&m.camara_id)?,
        status: parse_label(&m.status)?,
        data_apresentacao: parse_time(&m.data_apresentacao)?,
        created_at: parse_time(&m.created_at)?,
        updated_at: parse_time(&m.updated_at)?,
    })
}

fn into_voto(m: votos::Model) -> Result<Voto, StorageError> {
    Ok(Voto {
        projeto_id: parse_uuid(&m.projeto_id)?,
        vereador_id: parse_uuid(&m.vereador_id)?,
        voto: parse_label(&m.voto)?,
        registrado_em: parse_time(&m.registrado_em)?,
    })
}

fn collect<M, T>(
    rows: Vec<M>,
    convert: fn(M) -> Result<T, StorageError>,
) -> Result<Vec<T>, StorageError> {
    rows.into_iter().map(convert).collect()
}

fn presenca_model(p: &Presenca) -> presencas::ActiveModel {
    presencas::ActiveModel {
        sessao_id: Set(p.sessao_id.to_string()),
        vereador_id: Set(p.vereador_id.to_string()),
        presente: Set(p.presente),
        registrado_em: Set(fmt_time(p.registrado_em)),
    }
}

/// Whether the session exists with a status in `guard`, read through `conn`.
async fn sessao_admits<C: ConnectionTrait>(
    conn: &C,
    sessao_id: Uuid,
    guard: &[SessaoStatus],
) -> Result<bool, StorageError> {
    let row = sessoes::Entity::find_by_id(sessao_id.to_string())
        .filter(sessoes::Column::Status.is_in(guard.iter().map(|s| s.as_str())))
        .one(conn)
        .await
        .map_err(read_error)?;
    Ok(row.is_some())
}

/// SQLite-backed storage built on SeaORM.
///
/// The connection pool is created once and shared by every operation; each
/// operation checks a connection out of the pool and returns it when done.
pub struct DatabaseStorage {
    db: DatabaseConnection,
}

impl DatabaseStorage {
    /// Create or open the SQLite file at `path`, creating parent directories.
    pub async fn new_file<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;
            }
        }
        let url = format!("sqlite://{}?mode=rwc", path_ref.display());
        Self::connect(&url, 5).await
    }

    /// Connect to `url` and make sure the schema exists.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let mut opts = ConnectOptions::new(url.to_owned());
        opts.max_connections(max_connections).sqlx_logging(false);
        let db = Database::connect(opts).await.map_err(|e| {
            error!("Unable to open database {}: {}", url, e);
            StorageError::ConnectionFailed(e.to_string())
        })?;

        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .map_err(write_error)?;
        for statement in SCHEMA {
            db.execute_unprepared(statement).await.map_err(write_error)?;
        }
        info!("DatabaseStorage ready at {}", url);
        Ok(Self { db })
    }
}

#[async_trait]
impl Storage for DatabaseStorage {
    async fn save_camara(&self, camara: &Camara) -> Result<(), StorageError> {
        let model = camaras::ActiveModel {
            id: Set(camara.id.to_string()),
            nome: Set(camara.nome.clone()),
            cidade: Set(camara.cidade.clone()),
            created_at: Set(fmt_time(camara.created_at)),
        };
        camaras::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(write_error)?;
        Ok(())
    }

    async fn get_camara(&self, id: Uuid) -> Result<Option<Camara>, StorageError> {
        camaras::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(read_error)?
            .map(into_camara)
            .transpose()
    }

    async fn delete_camara(&self, id: Uuid) -> Result<bool, StorageError> {
        let key = id.to_string();
        let txn = self.db.begin().await.map_err(write_error)?;

        let projeto_ids: Vec<String> = projetos::Entity::find()
            .filter(projetos::Column::CamaraId.eq(key.clone()))
            .all(&txn)
            .await
            .map_err(read_error)?
            .into_iter()
            .map(|p| p.id)
            .collect();
        let sessao_ids: Vec<String> = sessoes::Entity::find()
            .filter(sessoes::Column::CamaraId.eq(key.clone()))
            .all(&txn)
            .await
            .map_err(read_error)?
            .into_iter()
            .map(|s| s.id)
            .collect();

        votos::Entity::delete_many()
            .filter(votos::Column::ProjetoId.is_in(projeto_ids))
            .exec(&txn)
            .await
            .map_err(write_error)?;
        projetos::Entity::delete_many()
            .filter(projetos::Column::CamaraId.eq(key.clone()))
            .exec(&txn)
            .await
            .map_err(write_error)?;
        presencas::Entity::delete_many()
            .filter(presencas::Column::SessaoId.is_in(sessao_ids))
            .exec(&txn)
            .await
            .map_err(write_error)?;
        sessoes::Entity::delete_many()
            .filter(sessoes::Column::CamaraId.eq(key.clone()))
            .exec(&txn)
            .await
            .map_err(write_error)?;
        vereadores::Entity::delete_many()
            .filter(vereadores::Column::CamaraId.eq(key.clone()))
            .exec(&txn)
            .await
            .map_err(write_error)?;
        let removed = camaras::Entity::delete_by_id(key)
            .exec(&txn)
            .await
            .map_err(write_error)?;

        txn.commit().await.map_err(write_error)?;
        debug!("Deleted camara {} ({} row)", id, removed.rows_affected);
        Ok(removed.rows_affected > 0)
    }

    async fn save_vereador(&self, vereador: &Vereador) -> Result<(), StorageError> {
        let model = vereadores::ActiveModel {
            id: Set(vereador.id.to_string()),
            camara_id: Set(vereador.camara_id.to_string()),
            nome: Set(vereador.nome.clone()),
            partido: Set(vereador.partido.clone()),
            ativo: Set(vereador.ativo),
            created_at: Set(fmt_time(vereador.created_at)),
        };
        vereadores::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(write_error)?;
        Ok(())
    }

    async fn get_vereador(&self, id: Uuid) -> Result<Option<Vereador>, StorageError> {
        vereadores::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(read_error)?
            .map(into_vereador)
            .transpose()
    }

    async fn get_vereadores(&self, camara_id: Uuid) -> Result<Vec<Vereador>, StorageError> {
        let rows = vereadores::Entity::find()
            .filter(vereadores::Column::CamaraId.eq(camara_id.to_string()))
            .order_by_asc(vereadores::Column::Nome)
            .all(&self.db)
            .await
            .map_err(read_error)?;
        collect(rows, into_vereador)
    }

    async fn save_sessao(&self, sessao: &Sessao) -> Result<(), StorageError> {
        let model = sessoes::ActiveModel {
            id: Set(sessao.id.to_string()),
            titulo: Set(sessao.titulo.clone()),
            descricao: Set(sessao.descricao.clone()),
            data: Set(fmt_time(sessao.data)),
            tipo: Set(sessao.tipo.as_str().to_string()),
            status: Set(sessao.status.as_str().to_string()),
            camara_id: Set(sessao.camara_id.to_string()),
            created_at: Set(fmt_time(sessao.created_at)),
            updated_at: Set(fmt_time(sessao.updated_at)),
        };
        sessoes::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(write_error)?;
        Ok(())
    }

    async fn get_sessao(&self, id: Uuid) -> Result<Option<Sessao>, StorageError> {
        sessoes::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(read_error)?
            .map(into_sessao)
            .transpose()
    }

    async fn get_sessoes(&self, filter: Option<SessaoFilter>) -> Result<Vec<Sessao>, StorageError> {
        let mut query = sessoes::Entity::find();
        if let Some(f) = &filter {
            if let Some(camara_id) = f.camara_id {
                query = query.filter(sessoes::Column::CamaraId.eq(camara_id.to_string()));
            }
            if let Some(status) = f.status {
                query = query.filter(sessoes::Column::Status.eq(status.as_str()));
            }
            if let Some(tipo) = f.tipo {
                query = query.filter(sessoes::Column::Tipo.eq(tipo.as_str()));
            }
            if let Some(de) = f.data_de {
                query = query.filter(sessoes::Column::Data.gte(fmt_time(de)));
            }
            if let Some(ate) = f.data_ate {
                query = query.filter(sessoes::Column::Data.lte(fmt_time(ate)));
            }
        }
        let rows = query
            .order_by_asc(sessoes::Column::Data)
            .all(&self.db)
            .await
            .map_err(read_error)?;
        collect(rows, into_sessao)
    }

    async fn update_sessao(
        &self,
        id: Uuid,
        changes: &SessaoChanges,
        guard: &[SessaoStatus],
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let mut update = sessoes::Entity::update_many()
            .col_expr(sessoes::Column::UpdatedAt, Expr::value(fmt_time(at)));
        if let Some(ref titulo) = changes.titulo {
            update = update.col_expr(sessoes::Column::Titulo, Expr::value(titulo.clone()));
        }
        if let Some(ref descricao) = changes.descricao {
            update = update.col_expr(sessoes::Column::Descricao, Expr::value(descricao.clone()));
        }
        if let Some(data) = changes.data {
            update = update.col_expr(sessoes::Column::Data, Expr::value(fmt_time(data)));
        }
        if let Some(tipo) = changes.tipo {
            update = update.col_expr(sessoes::Column::Tipo, Expr::value(tipo.as_str()));
        }
        let result = update
            .filter(sessoes::Column::Id.eq(id.to_string()))
            .filter(sessoes::Column::Status.is_in(guard.iter().map(|s| s.as_str())))
            .exec(&self.db)
            .await
            .map_err(write_error)?;
        Ok(result.rows_affected > 0)
    }

    async fn transition_sessao(
        &self,
        id: Uuid,
        from: &[SessaoStatus],
        to: SessaoStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let result = sessoes::Entity::update_many()
            .col_expr(sessoes::Column::Status, Expr::value(to.as_str()))
            .col_expr(sessoes::Column::UpdatedAt, Expr::value(fmt_time(at)))
            .filter(sessoes::Column::Id.eq(id.to_string()))
            .filter(sessoes::Column::Status.is_in(from.iter().map(|s| s.as_str())))
            .exec(&self.db)
            .await
            .map_err(write_error)?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_sessao(&self, id: Uuid, guard: &[SessaoStatus]) -> Result<bool, StorageError> {
        let key = id.to_string();
        let txn = self.db.begin().await.map_err(write_error)?;

        let current = sessoes::Entity::find_by_id(key.clone())
            .one(&txn)
            .await
            .map_err(read_error)?;
        let deletable = match current {
            Some(row) => guard.iter().any(|s| s.as_str() == row.status),
            None => false,
        };
        if !deletable {
            txn.rollback().await.map_err(write_error)?;
            return Ok(false);
        }

        let projeto_ids: Vec<String> = projetos::Entity::find()
            .filter(projetos::Column::SessaoId.eq(key.clone()))
            .all(&txn)
            .await
            .map_err(read_error)?
            .into_iter()
            .map(|p| p.id)
            .collect();
        votos::Entity::delete_many()
            .filter(votos::Column::ProjetoId.is_in(projeto_ids))
            .exec(&txn)
            .await
            .map_err(write_error)?;
        projetos::Entity::delete_many()
            .filter(projetos::Column::SessaoId.eq(key.clone()))
            .exec(&txn)
            .await
            .map_err(write_error)?;
        presencas::Entity::delete_many()
            .filter(presencas::Column::SessaoId.eq(key.clone()))
            .exec(&txn)
            .await
            .map_err(write_error)?;
        let removed = sessoes::Entity::delete_many()
            .filter(sessoes::Column::Id.eq(key))
            .filter(sessoes::Column::Status.is_in(guard.iter().map(|s| s.as_str())))
            .exec(&txn)
            .await
            .map_err(write_error)?;

        txn.commit().await.map_err(write_error)?;
        Ok(removed.rows_affected > 0)
    }

    async fn upsert_presenca(
        &self,
        presenca: &Presenca,
        guard: &[SessaoStatus],
    ) -> Result<bool, StorageError> {
        let update = || {
            presencas::Entity::update_many()
                .col_expr(presencas::Column::Presente, Expr::value(presenca.presente))
                .col_expr(
                    presencas::Column::RegistradoEm,
                    Expr::value(fmt_time(presenca.registrado_em)),
                )
                .filter(presencas::Column::SessaoId.eq(presenca.sessao_id.to_string()))
                .filter(presencas::Column::VereadorId.eq(presenca.vereador_id.to_string()))
        };

        let txn = self.db.begin().await.map_err(write_error)?;
        if !sessao_admits(&txn, presenca.sessao_id, guard).await? {
            txn.rollback().await.map_err(write_error)?;
            return Ok(false);
        }
        let updated = update().exec(&txn).await.map_err(write_error)?;
        if updated.rows_affected == 0 {
            if let Err(e) = presencas::Entity::insert(presenca_model(presenca))
                .exec_without_returning(&txn)
                .await
            {
                match write_error(e) {
                    // A concurrent writer inserted the key first; ours is the later write.
                    StorageError::UniqueViolation => {
                        update().exec(&txn).await.map_err(write_error)?;
                    }
                    other => return Err(other),
                }
            }
        }
        txn.commit().await.map_err(write_error)?;
        Ok(true)
    }

    async fn insert_presenca_if_absent(
        &self,
        presenca: &Presenca,
        guard: &[SessaoStatus],
    ) -> Result<GuardedInsert, StorageError> {
        let txn = self.db.begin().await.map_err(write_error)?;
        if !sessao_admits(&txn, presenca.sessao_id, guard).await? {
            txn.rollback().await.map_err(write_error)?;
            return Ok(GuardedInsert::Refused);
        }
        let outcome = match presencas::Entity::insert(presenca_model(presenca))
            .exec_without_returning(&txn)
            .await
        {
            Ok(_) => GuardedInsert::Inserted,
            Err(e) => match write_error(e) {
                StorageError::UniqueViolation => GuardedInsert::Existing,
                other => return Err(other),
            },
        };
        txn.commit().await.map_err(write_error)?;
        Ok(outcome)
    }

    async fn get_presencas(&self, sessao_id: Uuid) -> Result<Vec<Presenca>, StorageError> {
        let rows = presencas::Entity::find()
            .filter(presencas::Column::SessaoId.eq(sessao_id.to_string()))
            .all(&self.db)
            .await
            .map_err(read_error)?;
        collect(rows, into_presenca)
    }

    async fn save_projeto(&self, projeto: &Projeto) -> Result<(), StorageError> {
        let model = projetos::ActiveModel {
            id: Set(projeto.id.to_string()),
            titulo: Set(projeto.titulo.clone()),
            descricao: Set(projeto.descricao.clone()),
            autor: Set(projeto.autor.clone()),
            sessao_id: Set(projeto.sessao_id.map(|s| s.to_string())),
            camara_id: Set(projeto.camara_id.to_string()),
            status: Set(projeto.status.as_str().to_string()),
            data_apresentacao: Set(fmt_time(projeto.data_apresentacao)),
            created_at: Set(fmt_time(projeto.created_at)),
            updated_at: Set(fmt_time(projeto.updated_at)),
        };
        projetos::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(write_error)?;
        Ok(())
    }

    async fn get_projeto(&self, id: Uuid) -> Result<Option<Projeto>, StorageError> {
        projetos::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(read_error)?
            .map(into_projeto)
            .transpose()
    }

    async fn get_projetos(
        &self,
        filter: Option<ProjetoFilter>,
    ) -> Result<Vec<Projeto>, StorageError> {
        let mut query = projetos::Entity::find();
        if let Some(f) = &filter {
            if let Some(camara_id) = f.camara_id {
                query = query.filter(projetos::Column::CamaraId.eq(camara_id.to_string()));
            }
            if let Some(sessao_id) = f.sessao_id {
                query = query.filter(projetos::Column::SessaoId.eq(sessao_id.to_string()));
            }
            if let Some(status) = f.status {
                query = query.filter(projetos::Column::Status.eq(status.as_str()));
            }
        }
        let rows = query
            .order_by_asc(projetos::Column::DataApresentacao)
            .all(&self.db)
            .await
            .map_err(read_error)?;
        collect(rows, into_projeto)
    }

    async fn transition_projeto(
        &self,
        id: Uuid,
        from: &[ProjetoStatus],
        to: ProjetoStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let result = projetos::Entity::update_many()
            .col_expr(projetos::Column::Status, Expr::value(to.as_str()))
            .col_expr(projetos::Column::UpdatedAt, Expr::value(fmt_time(at)))
            .filter(projetos::Column::Id.eq(id.to_string()))
            .filter(projetos::Column::Status.is_in(from.iter().map(|s| s.as_str())))
            .exec(&self.db)
            .await
            .map_err(write_error)?;
        Ok(result.rows_affected > 0)
    }

    async fn save_voto(&self, voto: &Voto, guard: &[ProjetoStatus]) -> Result<bool, StorageError> {
        let model = votos::ActiveModel {
            projeto_id: Set(voto.projeto_id.to_string()),
            vereador_id: Set(voto.vereador_id.to_string()),
            voto: Set(voto.voto.as_str().to_string()),
            registrado_em: Set(fmt_time(voto.registrado_em)),
        };

        let txn = self.db.begin().await.map_err(write_error)?;
        let open = projetos::Entity::find_by_id(voto.projeto_id.to_string())
            .filter(projetos::Column::Status.is_in(guard.iter().map(|s| s.as_str())))
            .one(&txn)
            .await
            .map_err(read_error)?
            .is_some();
        if !open {
            txn.rollback().await.map_err(write_error)?;
            return Ok(false);
        }
        votos::Entity::insert(model)
            .exec_without_returning(&txn)
            .await
            .map_err(write_error)?;
        txn.commit().await.map_err(write_error)?;
        Ok(true)
    }

    async fn get_voto(
        &self,
        projeto_id: Uuid,
        vereador_id: Uuid,
    ) -> Result<Option<Voto>, StorageError> {
        votos::Entity::find_by_id((projeto_id.to_string(), vereador_id.to_string()))
            .one(&self.db)
            .await
            .map_err(read_error)?
            .map(into_voto)
            .transpose()
    }

    async fn get_votos(&self, projeto_id: Uuid) -> Result<Vec<Voto>, StorageError> {
        let rows = votos::Entity::find()
            .filter(votos::Column::ProjetoId.eq(projeto_id.to_string()))
            .order_by_asc(votos::Column::RegistradoEm)
            .all(&self.db)
            .await
            .map_err(read_error)?;
        collect(rows, into_voto)
    }
}
