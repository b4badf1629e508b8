//! Listing Registry — per-seller listing lifecycle and settlement
//!
//! Listings live in an append-only vector per seller; the index is a pure
//! counter, never recycled, and terminal listings stay in place for reads.
//! Every operation computes the collateral delta it needs and delegates the
//! balance movement to the ledger — the registry itself never touches a
//! balance record.

use std::collections::HashMap;

use tracing::{info, warn};
use types::asset::Asset;
use types::ids::AccountId;
use types::listing::{ItemRef, Listing, ListingState};

use crate::errors::{LedgerError, MarketError};
use crate::events::{
    BuyCanceled, BuyCommitted, ContractEvent, ItemListed, ItemReceived, ItemSent, ListingCanceled,
    PriceUpdated,
};
use crate::ledger::CollateralLedger;
use crate::BUYER_COLLATERAL_FACTOR;

/// Registry of listings, keyed by (seller, index).
#[derive(Debug, Default)]
pub struct ListingBook {
    /// Listings: seller -> append-only slots, index = position
    listings: HashMap<AccountId, Vec<Listing>>,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
}

impl ListingBook {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── Lifecycle ─────────────────────────

    /// Create a listing at the seller's next index, locking `price` as
    /// seller collateral. Returns the assigned index.
    pub fn list(
        &mut self,
        ledger: &mut CollateralLedger,
        seller: AccountId,
        item: ItemRef,
        price: u128,
        asset: Asset,
        attached: u128,
    ) -> Result<u64, MarketError> {
        if item.is_empty() {
            return Err(MarketError::EmptyItemReference);
        }
        if price == 0 {
            return Err(MarketError::InvalidPrice("price must be positive".to_string()));
        }

        ledger.lock(seller, asset, price, attached)?;

        let slots = self.listings.entry(seller).or_default();
        let index = slots.len() as u64;
        slots.push(Listing::new(item, price, asset));

        info!(seller = %seller, index, price, asset = %asset, "Item listed");
        self.events.push(ContractEvent::ItemListed(ItemListed {
            seller,
            index,
            item,
            price,
            asset,
        }));
        Ok(index)
    }

    /// Change the asking price of an open listing, locking the increase or
    /// unlocking the decrease.
    pub fn update_price(
        &mut self,
        ledger: &mut CollateralLedger,
        seller: AccountId,
        index: u64,
        new_price: u128,
        attached: u128,
    ) -> Result<(), MarketError> {
        let listing = self.listing(&seller, index)?;
        let (state, price, asset) = (listing.state, listing.price, listing.asset);

        if !state.can_modify() {
            return Err(MarketError::InvalidState {
                operation: "update_price",
                state,
            });
        }
        if new_price == 0 {
            return Err(MarketError::InvalidPrice("price must be positive".to_string()));
        }
        if new_price == price {
            return Err(MarketError::InvalidPrice(
                "new price equals current price".to_string(),
            ));
        }

        if new_price > price {
            ledger.lock(seller, asset, new_price - price, attached)?;
        } else {
            if attached != 0 {
                return Err(LedgerError::ValueMismatch {
                    required: 0,
                    attached,
                }
                .into());
            }
            ledger.unlock(seller, asset, price - new_price)?;
        }

        self.listing_mut(&seller, index)?.price = new_price;

        info!(
            seller = %seller,
            index,
            old_price = price,
            new_price,
            "Price updated"
        );
        self.events.push(ContractEvent::PriceUpdated(PriceUpdated {
            seller,
            index,
            old_price: price,
            new_price,
        }));
        Ok(())
    }

    /// Withdraw an open listing and release the seller's collateral.
    pub fn cancel(
        &mut self,
        ledger: &mut CollateralLedger,
        seller: AccountId,
        index: u64,
    ) -> Result<(), MarketError> {
        let listing = self.listing(&seller, index)?;
        let (state, price, asset) = (listing.state, listing.price, listing.asset);

        if !state.can_modify() {
            return Err(MarketError::InvalidState {
                operation: "cancel",
                state,
            });
        }

        ledger.unlock(seller, asset, price)?;
        self.listing_mut(&seller, index)?.state = ListingState::Canceled;

        info!(seller = %seller, index, "Listing canceled");
        self.events
            .push(ContractEvent::ListingCanceled(ListingCanceled { seller, index }));
        Ok(())
    }

    /// Commit `buyer` to purchase, locking the payment plus an equal
    /// collateral share.
    pub fn buy(
        &mut self,
        ledger: &mut CollateralLedger,
        buyer: AccountId,
        seller: AccountId,
        index: u64,
        attached: u128,
    ) -> Result<(), MarketError> {
        let listing = self.listing(&seller, index)?;
        let (state, price, asset) = (listing.state, listing.price, listing.asset);

        if !state.can_buy() {
            return Err(MarketError::InvalidState {
                operation: "buy",
                state,
            });
        }
        if buyer == seller {
            return Err(MarketError::NotAuthorized { caller: buyer });
        }

        let required = price
            .checked_mul(BUYER_COLLATERAL_FACTOR)
            .ok_or(MarketError::Overflow)?;
        ledger.lock(buyer, asset, required, attached)?;

        let listing = self.listing_mut(&seller, index)?;
        listing.buyer = Some(buyer);
        listing.state = ListingState::BuyCommitted;

        info!(seller = %seller, index, buyer = %buyer, "Buy committed");
        self.events.push(ContractEvent::BuyCommitted(BuyCommitted {
            seller,
            index,
            buyer,
            price,
        }));
        Ok(())
    }

    /// Let the committed buyer back out before the handoff, releasing the
    /// buyer's lock and reopening the listing.
    pub fn cancel_buy(
        &mut self,
        ledger: &mut CollateralLedger,
        caller: AccountId,
        seller: AccountId,
        index: u64,
    ) -> Result<(), MarketError> {
        let listing = self.listing(&seller, index)?;
        let (state, price, asset) = (listing.state, listing.price, listing.asset);

        if !state.can_cancel_buy() {
            return Err(MarketError::InvalidState {
                operation: "cancel_buy",
                state,
            });
        }
        let buyer = self.committed_buyer(&seller, index)?;
        if buyer != caller {
            return Err(MarketError::NotAuthorized { caller });
        }

        let required = price
            .checked_mul(BUYER_COLLATERAL_FACTOR)
            .ok_or(MarketError::Overflow)?;
        ledger.unlock(buyer, asset, required)?;

        let listing = self.listing_mut(&seller, index)?;
        listing.buyer = None;
        listing.state = ListingState::Listed;

        info!(seller = %seller, index, buyer = %buyer, "Buy canceled");
        self.events.push(ContractEvent::BuyCanceled(BuyCanceled {
            seller,
            index,
            buyer,
        }));
        Ok(())
    }

    /// Seller reports the item handed off. No collateral moves yet.
    pub fn mark_sent(&mut self, seller: AccountId, index: u64) -> Result<(), MarketError> {
        let listing = self.listing(&seller, index)?;
        if !listing.state.can_mark_sent() {
            return Err(MarketError::InvalidState {
                operation: "mark_sent",
                state: listing.state,
            });
        }

        self.listing_mut(&seller, index)?.state = ListingState::Sent;

        info!(seller = %seller, index, "Item marked sent");
        self.events
            .push(ContractEvent::ItemSent(ItemSent { seller, index }));
        Ok(())
    }

    /// Buyer confirms receipt: the terminal settlement.
    ///
    /// Moves the seller's own lock back to them and consumes the buyer's
    /// lock — payment to the seller, collateral share back to the buyer.
    /// Net effect: seller open +2×price, buyer keeps the collateral half of
    /// what they posted.
    pub fn mark_received(
        &mut self,
        ledger: &mut CollateralLedger,
        caller: AccountId,
        seller: AccountId,
        index: u64,
    ) -> Result<(), MarketError> {
        let listing = self.listing(&seller, index)?;
        let (state, price, asset) = (listing.state, listing.price, listing.asset);

        if !state.can_mark_received() {
            return Err(MarketError::InvalidState {
                operation: "mark_received",
                state,
            });
        }
        let buyer = self.committed_buyer(&seller, index)?;
        if buyer != caller {
            return Err(MarketError::NotAuthorized { caller });
        }

        let buyer_lock = price
            .checked_mul(BUYER_COLLATERAL_FACTOR)
            .ok_or(MarketError::Overflow)?;

        // Verify every debit and credit up front so the three movements
        // below cannot partially apply.
        let seller_locked = ledger.locked_collateral(&seller, &asset);
        if seller_locked < price {
            warn!(
                seller = %seller,
                locked = seller_locked,
                price,
                "Settlement shortfall on seller lock"
            );
            return Err(LedgerError::InsufficientLocked {
                asset,
                required: price,
                available: seller_locked,
            }
            .into());
        }
        let buyer_locked = ledger.locked_collateral(&buyer, &asset);
        if buyer_locked < buyer_lock {
            warn!(
                buyer = %buyer,
                locked = buyer_locked,
                required = buyer_lock,
                "Settlement shortfall on buyer lock"
            );
            return Err(LedgerError::InsufficientLocked {
                asset,
                required: buyer_lock,
                available: buyer_locked,
            }
            .into());
        }
        ledger
            .open_collateral(&seller, &asset)
            .checked_add(buyer_lock)
            .ok_or(MarketError::Overflow)?;
        ledger
            .open_collateral(&buyer, &asset)
            .checked_add(price)
            .ok_or(MarketError::Overflow)?;

        ledger.settle(seller, price, seller, price, asset)?;
        ledger.settle(buyer, price, seller, price, asset)?;
        ledger.settle(buyer, price, buyer, price, asset)?;

        self.listing_mut(&seller, index)?.state = ListingState::Received;

        info!(seller = %seller, index, buyer = %buyer, "Item received, trade settled");
        self.events.push(ContractEvent::ItemReceived(ItemReceived {
            seller,
            index,
            buyer,
        }));
        Ok(())
    }

    // ───────────────────────── Views ─────────────────────────

    /// Get a listing by (seller, index).
    pub fn get_item(&self, seller: &AccountId, index: u64) -> Result<&Listing, MarketError> {
        self.listing(seller, index)
    }

    /// All listings for a seller, in insertion order.
    pub fn items(&self, seller: &AccountId) -> &[Listing] {
        self.listings
            .get(seller)
            .map(|slots| slots.as_slice())
            .unwrap_or(&[])
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }

    // ───────────────────────── Internal ─────────────────────────

    fn listing(&self, seller: &AccountId, index: u64) -> Result<&Listing, MarketError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.listings.get(seller).and_then(|slots| slots.get(i)))
            .ok_or(MarketError::InvalidListing {
                seller: *seller,
                index,
            })
    }

    fn listing_mut(&mut self, seller: &AccountId, index: u64) -> Result<&mut Listing, MarketError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| {
                self.listings
                    .get_mut(seller)
                    .and_then(|slots| slots.get_mut(i))
            })
            .ok_or(MarketError::InvalidListing {
                seller: *seller,
                index,
            })
    }

    /// Recorded buyer of a committed listing. Absence in a committed state
    /// is registry corruption, not caller error.
    fn committed_buyer(&self, seller: &AccountId, index: u64) -> Result<AccountId, MarketError> {
        match self.listing(seller, index)?.buyer {
            Some(buyer) => Ok(buyer),
            None => {
                warn!(
                    seller = %seller,
                    index,
                    "Committed listing has no recorded buyer"
                );
                Err(MarketError::InvalidListing {
                    seller: *seller,
                    index,
                })
            }
        }
    }
}
