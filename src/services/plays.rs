use crate::db::{DbPlay, DirectoryDb, PlayInput};
use crate::error::ServiceError;
use crate::helpers::clean_opt;

use super::{found, required};

pub fn validate_play(input: PlayInput) -> Result<PlayInput, ServiceError> {
    Ok(PlayInput {
        title: required(&input.title, "title")?,
        playwright: clean_opt(input.playwright),
        archived: input.archived,
    })
}

pub fn list_plays(db: &DirectoryDb, include_archived: bool) -> Result<Vec<DbPlay>, ServiceError> {
    Ok(db.get_all_plays(include_archived)?)
}

pub fn get_play(db: &DirectoryDb, play_no: i64) -> Result<DbPlay, ServiceError> {
    found(db.get_play(play_no)?, "Play", play_no)
}

pub fn create_play(db: &DirectoryDb, input: PlayInput) -> Result<DbPlay, ServiceError> {
    let input = validate_play(input)?;
    let play_no = db.insert_play(&input)?;
    get_play(db, play_no)
}

pub fn update_play(db: &DirectoryDb, play_no: i64, input: PlayInput) -> Result<DbPlay, ServiceError> {
    let input = validate_play(input)?;
    if db.update_play(play_no, &input)? == 0 {
        return Err(ServiceError::not_found("Play", play_no));
    }
    get_play(db, play_no)
}

pub fn delete_play(db: &DirectoryDb, play_no: i64) -> Result<DbPlay, ServiceError> {
    let play = get_play(db, play_no)?;
    db.delete_play(play_no)?;
    Ok(play)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;

    #[test]
    fn test_title_required() {
        let db = test_db();
        assert!(matches!(
            create_play(&db, PlayInput::default()),
            Err(ServiceError::Validation(_))
        ));
        let play = create_play(
            &db,
            PlayInput {
                title: " Fences ".to_string(),
                playwright: Some("August Wilson".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(play.title, "Fences");
        assert!(matches!(
            update_play(&db, play.play_no + 1, PlayInput { title: "x".into(), ..Default::default() }),
            Err(ServiceError::NotFound(_))
        ));
    }
}
