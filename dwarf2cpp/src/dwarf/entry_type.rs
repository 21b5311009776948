use gimli::{AttributeValue, DW_AT_containing_type, DW_AT_specification, DW_AT_type};

use error_stack::{Result, ResultExt};

use super::unit::{bad, err_ctx, opt_ctx};
use super::{Error, UnitCtx, UnitOffset, DIE};

impl<'d, 'i> UnitCtx<'d, 'i> {
    /// Get the DW_AT_type of a DIE
    pub fn get_entry_type_offset(&self, entry: &DIE<'i, '_, '_>) -> Result<UnitOffset, Error> {
        let offset = self.to_global_offset(entry.offset());
        let type_value = err_ctx!(
            self,
            offset,
            Error::ReadEntryAttr(DW_AT_type),
            entry.attr_value(DW_AT_type)
        )?;
        let type_value = opt_ctx!(
            self,
            offset,
            Error::MissingEntryAttr(DW_AT_type),
            type_value
        )?;
        match type_value {
            AttributeValue::UnitRef(offset) => Ok(offset),
            _ => bad!(self, offset, Error::BadEntryAttrType(DW_AT_type, "UnitRef"))
                .attach_printable(format!("Got: {:?}", type_value)),
        }
    }

    /// Get the DW_AT_type of a DIE, allowing it to be missing
    pub fn get_entry_type_offset_optional(
        &self,
        entry: &DIE<'i, '_, '_>,
    ) -> Result<Option<UnitOffset>, Error> {
        let offset = self.to_global_offset(entry.offset());
        let type_value = err_ctx!(
            self,
            offset,
            Error::ReadEntryAttr(DW_AT_type),
            entry.attr_value(DW_AT_type)
        )?;
        match type_value {
            None => Ok(None),
            Some(AttributeValue::UnitRef(offset)) => Ok(Some(offset)),
            Some(other) => bad!(self, offset, Error::BadEntryAttrType(DW_AT_type, "UnitRef"))
                .attach_printable(format!("Got: {:?}", other)),
        }
    }

    /// Get the DW_AT_containing_type of a DIE
    pub fn get_entry_containing_type_offset(
        &self,
        entry: &DIE<'i, '_, '_>,
    ) -> Result<UnitOffset, Error> {
        let offset = self.to_global_offset(entry.offset());
        let type_value = err_ctx!(
            self,
            offset,
            Error::ReadEntryAttr(DW_AT_containing_type),
            entry.attr_value(DW_AT_containing_type)
        )?;
        let type_value = opt_ctx!(
            self,
            offset,
            Error::MissingEntryAttr(DW_AT_containing_type),
            type_value
        )?;
        match type_value {
            AttributeValue::UnitRef(offset) => Ok(offset),
            _ => bad!(
                self,
                offset,
                Error::BadEntryAttrType(DW_AT_containing_type, "UnitRef")
            )
            .attach_printable(format!("Got: {:?}", type_value)),
        }
    }

    /// Get the DW_AT_specification of a DIE, allowing it to be missing
    pub fn get_entry_specification(
        &self,
        entry: &DIE<'i, '_, '_>,
    ) -> Result<Option<UnitOffset>, Error> {
        let offset = self.to_global_offset(entry.offset());
        let spec = err_ctx!(
            self,
            offset,
            Error::ReadEntryAttr(DW_AT_specification),
            entry.attr_value(DW_AT_specification)
        )?;
        match spec {
            None => Ok(None),
            Some(AttributeValue::UnitRef(offset)) => Ok(Some(offset)),
            Some(other) => bad!(
                self,
                offset,
                Error::BadEntryAttrType(DW_AT_specification, "UnitRef")
            )
            .attach_printable(format!("Got: {:?}", other)),
        }
    }
}
