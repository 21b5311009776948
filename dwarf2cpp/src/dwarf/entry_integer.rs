use gimli::{
    AttributeValue, DW_ACCESS_private, DW_ACCESS_protected, DW_ACCESS_public, DW_AT_accessibility,
    DW_AT_const_value, DW_AT_upper_bound, DW_AT_virtuality, DW_VIRTUALITY_none,
    DW_VIRTUALITY_pure_virtual, DW_VIRTUALITY_virtual, DwAt,
};

use error_stack::{Result, ResultExt};

use crate::parsed::{Access, EnumValue};

use super::unit::{bad, err_ctx, opt_ctx};
use super::{Error, In, UnitCtx, DIE};

impl<'d, 'i> UnitCtx<'d, 'i> {
    /// Get the DW_AT_upper_bound of a DIE
    pub fn get_entry_upper_bound(&self, entry: &DIE<'i, '_, '_>) -> Result<u64, Error> {
        self.get_entry_unsigned_attr(entry, DW_AT_upper_bound)
    }

    /// Get the DW_AT_accessibility of a DIE, allowing it to be missing
    pub fn get_entry_accessibility(
        &self,
        entry: &DIE<'i, '_, '_>,
    ) -> Result<Option<Access>, Error> {
        let offset = self.to_global_offset(entry.offset());
        let value = err_ctx!(
            self,
            offset,
            Error::ReadEntryAttr(DW_AT_accessibility),
            entry.attr_value(DW_AT_accessibility)
        )?;
        match value {
            None => Ok(None),
            Some(AttributeValue::Accessibility(DW_ACCESS_public)) => Ok(Some(Access::Public)),
            Some(AttributeValue::Accessibility(DW_ACCESS_protected)) => Ok(Some(Access::Protected)),
            Some(AttributeValue::Accessibility(DW_ACCESS_private)) => Ok(Some(Access::Private)),
            _ => bad!(
                self,
                offset,
                Error::BadEntryAttrType(DW_AT_accessibility, "Accessibility")
            )
            .attach_printable(format!("Got: {:?}", value)),
        }
    }

    /// Whether the DW_AT_virtuality of a DIE marks it virtual
    pub fn get_entry_virtuality(&self, entry: &DIE<'i, '_, '_>) -> Result<bool, Error> {
        let offset = self.to_global_offset(entry.offset());
        let value = err_ctx!(
            self,
            offset,
            Error::ReadEntryAttr(DW_AT_virtuality),
            entry.attr_value(DW_AT_virtuality)
        )?;
        match value {
            None
            | Some(AttributeValue::Virtuality(DW_VIRTUALITY_none))
            | Some(AttributeValue::Virtuality(DW_VIRTUALITY_pure_virtual)) => Ok(false),
            Some(AttributeValue::Virtuality(DW_VIRTUALITY_virtual)) => Ok(true),
            _ => bad!(
                self,
                offset,
                Error::BadEntryAttrType(DW_AT_virtuality, "Virtuality")
            )
            .attach_printable(format!("Got: {:?}", value)),
        }
    }

    /// Get the DW_AT_const_value of an enumerator, preserving the
    /// signedness it was encoded with
    pub fn get_entry_enum_value(&self, entry: &DIE<'i, '_, '_>) -> Result<EnumValue, Error> {
        let offset = self.to_global_offset(entry.offset());
        let value = err_ctx!(
            self,
            offset,
            Error::ReadEntryAttr(DW_AT_const_value),
            entry.attr_value(DW_AT_const_value)
        )?;
        let value = opt_ctx!(
            self,
            offset,
            Error::MissingEntryAttr(DW_AT_const_value),
            value
        )?;
        match value {
            AttributeValue::Data1(x) => Ok(EnumValue::Unsigned(x as u64)),
            AttributeValue::Data2(x) => Ok(EnumValue::Unsigned(x as u64)),
            AttributeValue::Data4(x) => Ok(EnumValue::Unsigned(x as u64)),
            AttributeValue::Data8(x) => Ok(EnumValue::Unsigned(x)),
            AttributeValue::Udata(x) => Ok(EnumValue::Unsigned(x)),
            AttributeValue::Sdata(x) => Ok(EnumValue::Signed(x)),
            _ => bad!(self, offset, Error::InvalidEnumeratorValue)
                .attach_printable(format!("Got: {:?}", value)),
        }
    }

    /// Get an unsigned integer attribute value
    pub fn get_entry_unsigned_attr(
        &self,
        entry: &DIE<'i, '_, '_>,
        attr: DwAt,
    ) -> Result<u64, Error> {
        let offset = self.to_global_offset(entry.offset());
        let value = err_ctx!(
            self,
            offset,
            Error::ReadEntryAttr(attr),
            entry.attr_value(attr)
        )?;
        let value = opt_ctx!(self, offset, Error::MissingEntryAttr(attr), value)?;
        self.get_unsigned(offset, attr, value)
    }

    /// Get an attribute value as unsigned integer
    pub fn get_unsigned(
        &self,
        global_offset: usize,
        at: DwAt,
        attr: AttributeValue<In<'i>>,
    ) -> Result<u64, Error> {
        match attr {
            AttributeValue::Data1(x) => Ok(x as u64),
            AttributeValue::Data2(x) => Ok(x as u64),
            AttributeValue::Data4(x) => Ok(x as u64),
            AttributeValue::Data8(x) => Ok(x),
            AttributeValue::Udata(x) => Ok(x),
            _ => bad!(
                self,
                global_offset,
                Error::BadEntryAttrType(at, "unsigned data")
            )
            .attach_printable(format!("Got: {:?}", attr)),
        }
    }
}
